//! Packaged application introspection for hosts without packages

use super::PackageIntrospection;

/// Always reports that packaged applications cannot be inspected
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedPackages;

impl UnsupportedPackages {
    /// Matches the constructor of the Windows implementation
    pub fn new(_host_process: &str) -> Self {
        Self
    }
}

impl PackageIntrospection for UnsupportedPackages {
    fn is_supported(&self) -> bool {
        false
    }

    fn find_host(&self, _aumid: &str) -> Option<u32> {
        None
    }
}
