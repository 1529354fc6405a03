// handlers/auth/mod.rs - Admin account handlers

pub mod login; // POST /api/auth/login
pub mod me; // GET /api/auth/me (guarded)
pub mod register; // POST /api/auth/register

pub use login::login_post;
pub use me::me_get;
pub use register::register_post;
