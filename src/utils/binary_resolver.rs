use std::path::PathBuf;

/// Known system locations for Firefox, probed in order.
const FIREFOX_CANDIDATES: &[&str] = &[
    "/usr/bin/firefox-esr",
    "/usr/bin/firefox",
    "/snap/bin/firefox",
];

/// Known system locations for Chromium-family browsers, probed in order.
const CHROMIUM_CANDIDATES: &[&str] = &[
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
];

/// Probe fixed filesystem paths, then the system PATH, for one of the given
/// binary names. Returns the first hit plus every location that was checked,
/// for diagnostics when nothing is found.
pub fn find_browser_binary(
    candidates: &[&str],
    path_names: &[&str],
) -> (Option<PathBuf>, Vec<String>) {
    let mut checked_paths = Vec::new();

    for candidate in candidates {
        let path = PathBuf::from(candidate);
        checked_paths.push(format!("Fixed path: {}", path.display()));
        if path.exists() {
            return (Some(path), checked_paths);
        }
    }

    for name in path_names {
        checked_paths.push(format!("System PATH: {}", name));
        if let Ok(path) = which::which(name) {
            return (Some(path), checked_paths);
        }
    }

    (None, checked_paths)
}

/// Locate a Firefox binary on this machine.
pub fn find_firefox() -> (Option<PathBuf>, Vec<String>) {
    find_browser_binary(FIREFOX_CANDIDATES, &["firefox-esr", "firefox"])
}

/// Locate a Chromium-family binary on this machine.
pub fn find_chromium() -> (Option<PathBuf>, Vec<String>) {
    find_browser_binary(
        CHROMIUM_CANDIDATES,
        &["chromium", "chromium-browser", "google-chrome"],
    )
}

/// Cache directory of the automation library's managed browsers, if it has
/// ever been populated on this machine.
pub fn managed_browser_cache() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let cache = home.join(".cache").join("ms-playwright");
    if cache.is_dir() {
        Some(cache)
    } else {
        None
    }
}
