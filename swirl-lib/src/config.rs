use crate::error::SwirlError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One animation frame at 60Hz.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(16);

/// Browser vendor whose prefixed properties the engine binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Webkit,
    Moz,
    Ms,
    O,
}

impl Vendor {
    /// Short tag used as the key of vendor override values, e.g. `webkit`.
    pub fn tag(self) -> &'static str {
        match self {
            Vendor::Webkit => "webkit",
            Vendor::Moz => "moz",
            Vendor::Ms => "ms",
            Vendor::O => "o",
        }
    }

    /// Prefix prepended to a kebab-case property name, e.g. `-webkit-`.
    pub fn prefix(self) -> &'static str {
        match self {
            Vendor::Webkit => "-webkit-",
            Vendor::Moz => "-moz-",
            Vendor::Ms => "-ms-",
            Vendor::O => "-o-",
        }
    }

    /// Prefix a style object uses for camelCase names, e.g. `WebkitTransition`.
    pub fn camel_prefix(self) -> &'static str {
        match self {
            Vendor::Webkit => "Webkit",
            Vendor::Moz => "Moz",
            Vendor::Ms => "ms",
            Vendor::O => "O",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Vendor {
    type Err = SwirlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('-').to_ascii_lowercase().as_str() {
            "webkit" => Ok(Vendor::Webkit),
            "moz" => Ok(Vendor::Moz),
            "ms" => Ok(Vendor::Ms),
            "o" => Ok(Vendor::O),
            _ => Err(SwirlError::UnknownVendor(s.to_string())),
        }
    }
}

/// Engine-wide settings, fixed when a [`crate::Swirl`] context is created.
#[derive(Debug, Clone)]
pub struct Config {
    /// Debounce interval for rule compiles and sheet writes.
    pub window: Duration,
    /// Vendor prefix applied to properties the environment only supports prefixed.
    pub vendor: Option<Vendor>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window: DEFAULT_WINDOW,
            vendor: None,
        }
    }
}

impl Config {
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_vendor(mut self, vendor: Option<Vendor>) -> Self {
        self.vendor = vendor;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_from_str() {
        assert_eq!("webkit".parse::<Vendor>().unwrap(), Vendor::Webkit);
        assert_eq!("-moz-".parse::<Vendor>().unwrap(), Vendor::Moz);
        assert_eq!("MS".parse::<Vendor>().unwrap(), Vendor::Ms);
        assert!(matches!(
            "khtml".parse::<Vendor>(),
            Err(SwirlError::UnknownVendor(_))
        ));
    }

    #[test]
    fn test_default_window_is_one_frame() {
        let config = Config::default();
        assert_eq!(config.window, Duration::from_millis(16));
        assert!(config.vendor.is_none());
    }
}
