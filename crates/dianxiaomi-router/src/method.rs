//! HTTP methods, method masks and handler flags.

use std::fmt;
use std::ops::BitOr;

/// HTTP request methods the API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// HEAD method, routed as GET
    Head,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
}

impl Method {
    /// Parses a method from a verb string, ignoring case.
    ///
    /// Returns `None` for verbs the API does not route (OPTIONS, TRACE, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns the mask bit used to match this method against handlers.
    pub fn bit(self) -> MethodMask {
        match self {
            Self::Get | Self::Head => MethodMask::GET,
            Self::Post => MethodMask::POST,
            Self::Put => MethodMask::PUT,
            Self::Patch => MethodMask::PATCH,
            Self::Delete => MethodMask::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bitmask of the methods a handler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodMask(u16);

impl MethodMask {
    pub const GET: Self = Self(1);
    pub const POST: Self = Self(2);
    pub const PUT: Self = Self(4);
    pub const PATCH: Self = Self(8);
    pub const DELETE: Self = Self(16);

    pub const READABLE: Self = Self::GET;
    pub const CREATABLE: Self = Self::POST;
    pub const EDITABLE: Self = Self(Self::POST.0 | Self::PUT.0 | Self::PATCH.0);
    pub const DELETABLE: Self = Self::DELETE;
    pub const ALL_METHODS: Self = Self(Self::READABLE.0 | Self::EDITABLE.0 | Self::DELETABLE.0);

    /// Returns the raw bits.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns true if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Lists the verbs this mask accepts. GET implies HEAD.
    pub fn verbs(self) -> Vec<&'static str> {
        let mut verbs = Vec::new();
        if self.contains(Self::GET) {
            verbs.push("HEAD");
            verbs.push("GET");
        }
        for (bit, name) in [
            (Self::POST, "POST"),
            (Self::PUT, "PUT"),
            (Self::PATCH, "PATCH"),
            (Self::DELETE, "DELETE"),
        ] {
            if self.contains(bit) {
                verbs.push(name);
            }
        }
        verbs
    }
}

impl BitOr for MethodMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Extra semantics attached to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RouteFlags(u16);

impl RouteFlags {
    pub const NONE: Self = Self(0);
    /// Parse the request body and bind it as `data`.
    pub const ACCEPT_DATA: Self = Self(64);
    /// Bind the raw request body as `data`.
    pub const ACCEPT_RAW_DATA: Self = Self(128);
    /// Leave the route out of the index listing.
    pub const HIDDEN_ENDPOINT: Self = Self(256);

    /// Returns true if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }
}

impl BitOr for RouteFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
