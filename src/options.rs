//! Link options: where root-relative links start, which parameters carry over.
//!
//! Options come in two layers. The *base* layer is fixed when the app is
//! built ([`App::link_options`](crate::App::link_options)); a *call* layer
//! may be passed to [`Request::link_to_with`](crate::Request::link_to_with).
//! Each field set in the call layer replaces the base field wholesale.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::context::RequestContext;
use crate::error::Error;
use crate::params::ParamsPolicy;

static NO_PARAMS: ParamsPolicy = ParamsPolicy::None;

/// Where a root-relative target (`"/base"`) is anchored.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AbsoluteMode {
    /// `scheme://host/base`, ignoring any proxy prefix.
    Host,
    /// `scheme://host<proxy-base>/base`.
    #[default]
    Proxy,
    /// `scheme://host<proxy-base><route-base>/base`.
    Route,
}

impl AbsoluteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host  => "host",
            Self::Proxy => "proxy",
            Self::Route => "route",
        }
    }

    /// The path inserted in front of a root-relative target.
    pub(crate) fn prefix(self, ctx: &RequestContext) -> Cow<'_, str> {
        match self {
            Self::Host  => Cow::Borrowed(""),
            Self::Proxy => Cow::Borrowed(ctx.proxy_base()),
            Self::Route => Cow::Owned(format!("{}{}", ctx.proxy_base(), ctx.route_base())),
        }
    }
}

impl FromStr for AbsoluteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host"  => Ok(Self::Host),
            "proxy" => Ok(Self::Proxy),
            "route" => Ok(Self::Route),
            other   => Err(Error::invalid(format!(
                "unknown absolute mode `{other}` (expected host, proxy or route)"
            ))),
        }
    }
}

impl fmt::Display for AbsoluteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One layer of link options. Unset fields fall through to the layer below.
///
/// ```rust
/// use tsu::{AbsoluteMode, LinkOptions, ParamsPolicy};
///
/// let base = LinkOptions::new()
///     .absolute(AbsoluteMode::Route)
///     .params(ParamsPolicy::allow_list(["page"]));
/// # let _ = base;
/// ```
#[derive(Clone, Debug, Default)]
pub struct LinkOptions {
    absolute: Option<AbsoluteMode>,
    params: Option<ParamsPolicy>,
}

impl LinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absolute(mut self, mode: AbsoluteMode) -> Self {
        self.absolute = Some(mode);
        self
    }

    pub fn params(mut self, policy: ParamsPolicy) -> Self {
        self.params = Some(policy);
        self
    }

    /// Layers `call` over `self` over the defaults.
    pub(crate) fn effective<'a>(&'a self, call: Option<&'a LinkOptions>) -> Effective<'a> {
        let call_absolute = call.and_then(|c| c.absolute);
        let call_params = call.and_then(|c| c.params.as_ref());
        Effective {
            absolute: call_absolute.or(self.absolute).unwrap_or_default(),
            params: call_params.or(self.params.as_ref()).unwrap_or(&NO_PARAMS),
        }
    }
}

/// The options in force for a single `link_to` call.
#[derive(Debug)]
pub(crate) struct Effective<'a> {
    pub absolute: AbsoluteMode,
    pub params: &'a ParamsPolicy,
}
