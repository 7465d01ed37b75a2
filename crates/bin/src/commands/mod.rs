pub mod bind;
pub mod check;
pub mod info;
pub mod list;
pub mod show;
pub mod unbind;
