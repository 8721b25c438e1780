//! C-compatible Foreign Function Interface (FFI) for traffic-phase
//!
//! This module provides C-compatible bindings that allow the traffic-phase
//! scheduler to be driven from C, C++, Python (via ctypes), and other
//! languages that support calling C libraries.
//!
//! # Memory Management
//!
//! - All string parameters should be null-terminated C strings (char*)
//! - Intersections are created with `phase_intersection_new()` and must be
//!   released with `phase_intersection_free()`
//! - Vehicle ids passed to the step callback are only valid for the duration
//!   of the callback
//!
//! # Error Handling
//!
//! Admission returns a PhaseResult code:
//! - 0: Success
//! - 1: Invalid parameter
//! - 2: Malformed maneuver (unknown road or U-turn)
//! - 3: No eligible lane
//! - 4: Internal error
//!
//! `phase_step()` returns the number of released vehicles, or the negated
//! PhaseResult code on failure.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::core::intersection::Intersection;
use crate::core::layout::Preset;

/// Result codes for C FFI
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseResult {
    Success = 0,
    InvalidParameter = 1,
    MalformedManeuver = 2,
    NoEligibleLane = 3,
    InternalError = 4,
}

/// Callback invoked once per released vehicle
pub type ReleaseCallback = extern "C" fn(vehicle_id: *const c_char, user_data: *mut c_void);

/// Convert Rust Result to C result code
fn convert_error(result: crate::Result<()>) -> PhaseResult {
    match result {
        Ok(()) => PhaseResult::Success,
        Err(crate::Error::UnknownRoad { .. }) | Err(crate::Error::MalformedManeuver { .. }) => {
            PhaseResult::MalformedManeuver
        }
        Err(crate::Error::NoEligibleLane { .. }) | Err(crate::Error::MissingApproach(_)) => {
            PhaseResult::NoEligibleLane
        }
        Err(crate::Error::InvalidCommand(_)) => PhaseResult::InvalidParameter,
        Err(_) => PhaseResult::InternalError,
    }
}

/// Borrow a C string as UTF-8
///
/// # Safety
/// `ptr` must be null or point to a valid null-terminated string.
unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Create an empty intersection from a preset name
///
/// # Parameters
/// - `preset`: "single-lane", "dedicated" or "multi-lane" (null-terminated
///   string), or NULL for "single-lane"
///
/// # Returns
/// Intersection handle, or NULL if the preset is unknown
#[no_mangle]
pub extern "C" fn phase_intersection_new(preset: *const c_char) -> *mut Intersection {
    let preset = if preset.is_null() {
        Preset::default()
    } else {
        match unsafe { borrow_str(preset) }.and_then(Preset::from_name) {
            Some(preset) => preset,
            None => return ptr::null_mut(),
        }
    };

    match preset.build() {
        Ok(intersection) => Box::into_raw(Box::new(intersection)),
        Err(_) => ptr::null_mut(),
    }
}

/// Free an intersection created by `phase_intersection_new()`
#[no_mangle]
pub extern "C" fn phase_intersection_free(handle: *mut Intersection) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
    }
}

/// Queue a vehicle on the intersection
///
/// # Parameters
/// - `handle`: Intersection handle
/// - `vehicle_id`: Opaque vehicle label (null-terminated string)
/// - `start_road`, `end_road`: Road names such as "north" (null-terminated strings)
///
/// # Returns
/// PhaseResult code
#[no_mangle]
pub extern "C" fn phase_admit(
    handle: *mut Intersection,
    vehicle_id: *const c_char,
    start_road: *const c_char,
    end_road: *const c_char,
) -> PhaseResult {
    let Some(intersection) = (unsafe { handle.as_mut() }) else {
        return PhaseResult::InvalidParameter;
    };

    let (Some(id), Some(start), Some(end)) = (unsafe {
        (
            borrow_str(vehicle_id),
            borrow_str(start_road),
            borrow_str(end_road),
        )
    }) else {
        return PhaseResult::InvalidParameter;
    };

    convert_error(intersection.admit_route(id, start, end))
}

/// Run one scheduling step
///
/// # Parameters
/// - `handle`: Intersection handle
/// - `callback`: Optional function called once per released vehicle
/// - `user_data`: User data pointer passed to the callback
///
/// # Returns
/// Number of released vehicles, or a negated PhaseResult code on failure
#[no_mangle]
pub extern "C" fn phase_step(
    handle: *mut Intersection,
    callback: Option<ReleaseCallback>,
    user_data: *mut c_void,
) -> i32 {
    let Some(intersection) = (unsafe { handle.as_mut() }) else {
        return -(PhaseResult::InvalidParameter as i32);
    };

    let released = match intersection.step() {
        Ok(released) => released,
        Err(_) => return -(PhaseResult::InternalError as i32),
    };

    if let Some(callback) = callback {
        for vehicle in &released {
            // Ids admitted through phase_admit never contain interior NULs
            if let Ok(id) = CString::new(vehicle.id()) {
                callback(id.as_ptr(), user_data);
            }
        }
    }

    i32::try_from(released.len()).unwrap_or(i32::MAX)
}

/// Get library version string
///
/// # Returns
/// Static string with version information (does not need to be freed)
#[no_mangle]
pub extern "C" fn phase_version() -> *const c_char {
    concat!("traffic-phase ", env!("PHASE_VERSION"), "\0")
        .as_ptr()
        .cast()
}
