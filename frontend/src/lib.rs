//! Browser client for the lead and booking forms.
//!
//! Compiled to wasm and loaded by the static site. On start it hooks the
//! `#quickLeadForm` and `#bookingForm` elements, sends their fields to the
//! submission endpoint as JSON, and reports the result with a toast.

mod forms;
mod payload;
mod toast;

use wasm_bindgen::prelude::wasm_bindgen;

#[wasm_bindgen(start)]
pub fn start() {
    forms::attach_all();
}
