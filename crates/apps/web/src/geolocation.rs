use std::cell::RefCell;
use std::rc::Rc;

use foundation::Position;
use js_sys::Reflect;
use streaming::{FixSink, LocationError, LocationSource, WatchId, WatchOptions};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{GeolocationPosition, GeolocationPositionError, Navigator, PositionOptions};

/// [`LocationSource`] backed by `navigator.geolocation`.
pub struct BrowserLocation {
    navigator: Option<Navigator>,
}

impl BrowserLocation {
    pub fn new() -> Self {
        Self {
            navigator: web_sys::window().map(|w| w.navigator()),
        }
    }
}

impl Default for BrowserLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for BrowserLocation {
    fn is_available(&self) -> bool {
        self.navigator
            .as_ref()
            .map(|nav| Reflect::has(nav, &JsValue::from_str("geolocation")).unwrap_or(false))
            .unwrap_or(false)
    }

    fn watch(&mut self, options: &WatchOptions, sink: FixSink) -> Result<WatchId, LocationError> {
        let navigator = self
            .navigator
            .as_ref()
            .ok_or(LocationError::PositionUnavailable)?;
        let geolocation = navigator
            .geolocation()
            .map_err(|e| LocationError::Other(format!("{e:?}")))?;

        let sink = Rc::new(RefCell::new(sink));
        let on_fix_sink = sink.clone();
        let on_fix = Closure::<dyn FnMut(JsValue)>::new(move |pos: JsValue| {
            let coords = pos.unchecked_into::<GeolocationPosition>().coords();
            (*on_fix_sink.borrow_mut())(Ok(Position::new(coords.latitude(), coords.longitude())));
        });
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |err: JsValue| {
            web_sys::console::error_1(&err);
            let err = err.unchecked_into::<GeolocationPositionError>();
            (*sink.borrow_mut())(Err(LocationError::from_code(err.code(), &err.message())));
        });

        let opts = PositionOptions::new();
        opts.set_enable_high_accuracy(options.enable_high_accuracy);
        opts.set_timeout(options.timeout_ms);
        opts.set_maximum_age(options.maximum_age_ms);

        let id = geolocation
            .watch_position_with_error_callback_and_options(
                on_fix.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &opts,
            );

        // The watch lives as long as the page.
        on_fix.forget();
        on_error.forget();
        Ok(WatchId(id))
    }
}
