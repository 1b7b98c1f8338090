pub mod license_selection;

pub use license_selection::LicenseSelection;
