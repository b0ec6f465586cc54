/// Compile-time build metadata produced by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("PSICOSYSTEM_BUILD_HASH").unwrap_or("unknown"),
        git_status: option_env!("PSICOSYSTEM_BUILD_STATUS").unwrap_or("unknown"),
        timestamp: option_env!("PSICOSYSTEM_BUILD_TIMESTAMP").unwrap_or("unknown"),
        target: option_env!("PSICOSYSTEM_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("PSICOSYSTEM_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("PSICOSYSTEM_BUILD_RUSTC").unwrap_or("unknown"),
    }
}

impl BuildMetadata {
    /// Lines printed by `psicosystem --version`.
    pub fn report(&self) -> Vec<String> {
        vec![
            format!("PsicoSystem {}", self.version),
            format!("  Build hash : {} ({})", self.git_hash, self.git_status),
            format!("  Built at   : {}", self.timestamp),
            format!("  Target     : {}", self.target),
            format!("  Profile    : {}", self.profile),
            format!("  Rustc      : {}", self.rustc),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_starts_with_package_version() {
        let report = current().report();
        assert_eq!(report[0], format!("PsicoSystem {}", env!("CARGO_PKG_VERSION")));
        assert_eq!(report.len(), 6);
    }
}
