pub mod reddit;
