pub mod ports;
pub mod qualify_use_case;
pub mod standardize_use_case;

pub use qualify_use_case::QualifyUseCase;
pub use standardize_use_case::StandardizeUseCase;
