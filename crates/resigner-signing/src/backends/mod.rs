//! Production signing backend implementations

pub mod codesign;
pub mod jarsigner;

pub use codesign::CodesignBackend;
pub use jarsigner::JarsignerBackend;
