mod applications;
mod common;
mod saved;
