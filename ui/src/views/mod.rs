mod explorer;
mod home;

pub use explorer::Explorer;
pub use home::Home;
