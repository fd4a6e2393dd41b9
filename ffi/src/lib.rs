/*
 * lib.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Tagliacarte, a cross-platform email client.
 *
 * Tagliacarte is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Tagliacarte is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Tagliacarte.  If not, see <http://www.gnu.org/licenses/>.
 */

//! C FFI for tagliacarte content handlers. A handler is an opaque pointer created with
//! tagliacarte_content_new and released with tagliacarte_content_free.
//! Output buffers are newly allocated (free with tagliacarte_content_free_buffer).
//! All string parameters are UTF-8 NUL-terminated. Functions returning c_int return 0 on
//! success and -1 on error; the message is then available from tagliacarte_content_last_error.

use libc::{c_char, c_int, c_void, size_t};
use std::ffi::{CStr, CString};
use std::path::PathBuf;
use std::ptr;
use tagliacarte_content::config::{default_config_path, default_max_line_length, load_config};
use tagliacarte_content::{
    BufferContentHandler, ContentHandler, EncoderRegistry, Encoding, MediaType, ProgressListener,
};
use tracing::debug;

/// Opaque handler passed across the C boundary.
pub struct TagliacarteContent {
    handler: BufferContentHandler,
}

/// Progress callback: (bytes consumed so far, total stored bytes, user_data).
type OnProgress = extern "C" fn(u64, u64, *mut c_void);

struct CallbackProgress {
    callback: OnProgress,
    user_data: *mut c_void,
}

impl ProgressListener for CallbackProgress {
    fn start(&mut self, total: u64) {
        (self.callback)(0, total, self.user_data);
    }

    fn progress(&mut self, current: u64, total: u64) {
        (self.callback)(current, total, self.user_data);
    }

    fn stop(&mut self, total: u64) {
        (self.callback)(total, total, self.user_data);
    }
}

thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> = const { std::cell::RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    debug!(error = msg, "ffi call failed");
    let msg = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(msg));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

fn ptr_to_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string()) }
}

/// NULL encoding means "none" (raw data).
fn ptr_to_encoding(ptr: *const c_char) -> Option<Encoding> {
    if ptr.is_null() {
        return Some(Encoding::None);
    }
    ptr_to_str(ptr).map(|s| Encoding::from_name(&s))
}

/// Copy `data` (or an empty slice when data is NULL).
unsafe fn ptr_to_bytes(data: *const u8, len: size_t) -> Vec<u8> {
    if data.is_null() || len == 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(data, len).to_vec()
}

/// Hand `buf` to C through out_data/out_len.
unsafe fn return_buffer(buf: Vec<u8>, out_data: *mut *mut u8, out_len: *mut size_t) {
    let len = buf.len();
    let raw = Box::into_raw(buf.into_boxed_slice()) as *mut u8;
    *out_data = raw;
    *out_len = len;
}

/// Version string (static, do not free).
#[no_mangle]
pub extern "C" fn tagliacarte_content_version() -> *const c_char {
    b"0.1.0\0".as_ptr() as *const c_char
}

/// Install a tracing subscriber writing to stderr, filtered by RUST_LOG. Safe to call more than once.
#[no_mangle]
pub extern "C" fn tagliacarte_content_init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Last error message from a failed call. Valid until next FFI call on this thread. Do not free.
#[no_mangle]
pub extern "C" fn tagliacarte_content_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string returned by tagliacarte_content_encoding. No-op if ptr is NULL.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

/// Free a buffer returned by generate/extract/extract_raw. len must be the length returned with it.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_free_buffer(data: *mut u8, len: size_t) {
    if !data.is_null() {
        let _ = Box::from_raw(ptr::slice_from_raw_parts_mut(data, len));
    }
}

/// Load ~/.tagliacarte/transcode.xml (or `path` if not NULL) and apply it to the process-wide
/// codec registry: aliases and default line length.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_load_config(path: *const c_char) -> c_int {
    let path = if path.is_null() {
        default_config_path()
    } else {
        ptr_to_str(path).map(PathBuf::from)
    };
    let Some(path) = path else {
        set_last_error("no config path");
        return -1;
    };
    match load_config(&path) {
        Ok(config) => {
            config.apply(EncoderRegistry::global());
            clear_last_error();
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ---------- Handler ----------

/// Create a handler over a copy of `data`. encoding: the encoding `data` is stored in, or NULL/"none"
/// for raw data. Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_new(
    data: *const u8,
    len: size_t,
    encoding: *const c_char,
) -> *mut TagliacarteContent {
    let Some(encoding) = ptr_to_encoding(encoding) else {
        set_last_error("encoding is not valid UTF-8");
        return ptr::null_mut();
    };
    clear_last_error();
    let handler = BufferContentHandler::new(ptr_to_bytes(data, len), encoding);
    Box::into_raw(Box::new(TagliacarteContent { handler }))
}

/// Free a handler. No-op if NULL.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_free(content: *mut TagliacarteContent) {
    if !content.is_null() {
        let _ = Box::from_raw(content);
    }
}

/// Replace data and encoding together. On error the handler is unchanged.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_set_data(
    content: *mut TagliacarteContent,
    data: *const u8,
    len: size_t,
    encoding: *const c_char,
) -> c_int {
    let Some(content) = content.as_mut() else {
        set_last_error("content is null");
        return -1;
    };
    let Some(encoding) = ptr_to_encoding(encoding) else {
        set_last_error("encoding is not valid UTF-8");
        return -1;
    };
    content.handler.set_data(ptr_to_bytes(data, len), encoding);
    clear_last_error();
    0
}

/// Set the content-type hint, e.g. "text/plain; charset=utf-8". Text types make encoders treat
/// line breaks as line breaks.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_set_content_type(
    content: *mut TagliacarteContent,
    content_type: *const c_char,
) -> c_int {
    let Some(content) = content.as_mut() else {
        set_last_error("content is null");
        return -1;
    };
    match ptr_to_str(content_type).as_deref().and_then(MediaType::parse) {
        Some(media_type) => {
            content.handler.set_content_type_hint(media_type);
            clear_last_error();
            0
        }
        None => {
            set_last_error("content_type is not a valid type/subtype");
            -1
        }
    }
}

/// Stored length in bytes (encoded length if encoded). 0 if content is NULL.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_length(content: *const TagliacarteContent) -> size_t {
    content.as_ref().map(|c| c.handler.get_length()).unwrap_or(0)
}

/// 1 if the stored data is transfer-encoded, 0 if raw (or content is NULL).
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_is_encoded(content: *const TagliacarteContent) -> c_int {
    content.as_ref().map(|c| c.handler.is_encoded() as c_int).unwrap_or(0)
}

/// Name of the stored encoding ("none" when raw). Caller frees with tagliacarte_content_free_string.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_encoding(content: *const TagliacarteContent) -> *mut c_char {
    match content.as_ref() {
        Some(c) => CString::new(c.handler.get_encoding().name())
            .map(CString::into_raw)
            .unwrap_or(ptr::null_mut()),
        None => ptr::null_mut(),
    }
}

/// Produce the content encoded under `encoding` (NULL/"none" = decoded). max_line_length 0 uses the
/// configured default. On success *out_data/*out_len receive a buffer to free with
/// tagliacarte_content_free_buffer.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_generate(
    content: *const TagliacarteContent,
    encoding: *const c_char,
    max_line_length: size_t,
    out_data: *mut *mut u8,
    out_len: *mut size_t,
) -> c_int {
    let Some(content) = content.as_ref() else {
        set_last_error("content is null");
        return -1;
    };
    if out_data.is_null() || out_len.is_null() {
        set_last_error("output pointers are null");
        return -1;
    }
    let Some(encoding) = ptr_to_encoding(encoding) else {
        set_last_error("encoding is not valid UTF-8");
        return -1;
    };
    let max_line_length = if max_line_length == 0 {
        default_max_line_length()
    } else {
        max_line_length
    };
    let mut out = Vec::new();
    match content.handler.generate(&mut out, &encoding, max_line_length) {
        Ok(_) => {
            return_buffer(out, out_data, out_len);
            clear_last_error();
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

unsafe fn extract_common(
    content: *const TagliacarteContent,
    raw: bool,
    on_progress: Option<OnProgress>,
    user_data: *mut c_void,
    out_data: *mut *mut u8,
    out_len: *mut size_t,
) -> c_int {
    let Some(content) = content.as_ref() else {
        set_last_error("content is null");
        return -1;
    };
    if out_data.is_null() || out_len.is_null() {
        set_last_error("output pointers are null");
        return -1;
    }
    let mut progress = on_progress.map(|callback| CallbackProgress { callback, user_data });
    let listener = progress.as_mut().map(|p| p as &mut dyn ProgressListener);
    let mut out = Vec::with_capacity(content.handler.get_length());
    let result = if raw {
        content.handler.extract_raw(&mut out, listener)
    } else {
        content.handler.extract(&mut out, listener)
    };
    match result {
        Ok(_) => {
            return_buffer(out, out_data, out_len);
            clear_last_error();
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Decoded content. on_progress (optional) reports stored bytes consumed.
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_extract(
    content: *const TagliacarteContent,
    on_progress: Option<OnProgress>,
    user_data: *mut c_void,
    out_data: *mut *mut u8,
    out_len: *mut size_t,
) -> c_int {
    extract_common(content, false, on_progress, user_data, out_data, out_len)
}

/// Stored bytes, exactly as held (no decoding).
#[no_mangle]
pub unsafe extern "C" fn tagliacarte_content_extract_raw(
    content: *const TagliacarteContent,
    on_progress: Option<OnProgress>,
    user_data: *mut c_void,
    out_data: *mut *mut u8,
    out_len: *mut size_t,
) -> c_int {
    extract_common(content, true, on_progress, user_data, out_data, out_len)
}
