use std::ffi::c_void;

use core_foundation::{
    base::TCFType,
    dictionary::{CFDictionaryGetValue, CFDictionaryRef},
    number::CFNumber,
    string::{CFString, CFStringRef},
};

use crate::geom::Frame;

/// Raw value for `key`, if present.
fn dict_get(dict: CFDictionaryRef, key: CFStringRef) -> Option<*const c_void> {
    // SAFETY: `dict` is a live CFDictionary borrowed from the caller.
    let value = unsafe { CFDictionaryGetValue(dict, key as *const c_void) };
    (!value.is_null()).then_some(value)
}

/// Get a 32-bit integer from CFDictionary for the given key.
pub(crate) fn dict_get_i32(dict: CFDictionaryRef, key: CFStringRef) -> Option<i32> {
    let value = dict_get(dict, key)?;
    let n = unsafe { CFNumber::wrap_under_get_rule(value as _) };
    n.to_i64().and_then(|v| i32::try_from(v).ok())
}

/// Get an f64 from CFDictionary for the given key.
pub(crate) fn dict_get_f64(dict: CFDictionaryRef, key: CFStringRef) -> Option<f64> {
    let value = dict_get(dict, key)?;
    let n = unsafe { CFNumber::wrap_under_get_rule(value as _) };
    n.to_f64()
}

/// Read a `{X, Y, Width, Height}` bounds dictionary (as stored under
/// `kCGWindowBounds`).
pub(crate) fn dict_get_frame(dict: CFDictionaryRef, key: CFStringRef) -> Option<Frame> {
    let bounds = dict_get(dict, key)? as CFDictionaryRef;
    let field = |name: &'static str| {
        let k = CFString::from_static_string(name);
        dict_get_f64(bounds, k.as_concrete_TypeRef())
    };
    Some(Frame::new(
        field("X")?,
        field("Y")?,
        field("Width")?,
        field("Height")?,
    ))
}
