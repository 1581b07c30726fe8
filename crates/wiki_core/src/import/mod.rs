//! Batch loaders for historical article exports.
//!
//! Not part of the request path: loaders write straight through the
//! repository without a permission check and are meant for operator tools.

pub mod tiddler;
