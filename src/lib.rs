pub mod action;
pub mod buffer;
pub mod config;
pub mod cursor;
pub mod error;
pub mod logger;
pub mod mode;
pub mod note_list;
pub mod screen;
pub mod session;
pub mod terminal;
pub mod vault;
pub mod widget;

// 画面レイアウト定数
pub const HEADER_HEIGHT: u16 = 2;
pub const STATUS_LINE_HEIGHT: u16 = 1;
pub const HELP_HEIGHT: u16 = 1;
pub const FOOTER_HEIGHT: u16 = STATUS_LINE_HEIGHT + HELP_HEIGHT;
pub const UI_HEIGHT: u16 = HEADER_HEIGHT + FOOTER_HEIGHT;
