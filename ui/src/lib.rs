//! Shared UI crate for DrugLens. Data access, charts and views live here; the
//! `web` and `desktop` crates only provide routing and launch.

pub mod charts;
pub mod core;
pub mod drugs;
pub mod i18n;
pub mod views;

pub mod components {
    // Localized application navbar (components/app_navbar.rs)
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;
}

pub use crate::core::config::AppConfig;

#[cfg(test)]
mod tests {
    mod i18n_completeness;
}
