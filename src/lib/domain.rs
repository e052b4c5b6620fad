//! Domain types shared by every mail delivery backend

pub mod mail;
