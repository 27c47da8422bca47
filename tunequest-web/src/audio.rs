//! Web-specific audio output
//!
//! Implements the engine's playback seam over `HtmlAudioElement`. Each start
//! creates a fresh element; the browser's autoplay policy is surfaced as a
//! recoverable `Blocked` report through the play-promise rather than a hard
//! error.

use crate::dom::js_error_message;
use tunequest_engine::{AudioHandle, AudioOutput, AudioSource, PlaybackFault};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;
use yew::Callback;

/// `AudioOutput` backed by browser audio elements.
pub struct ElementOutput {
    on_fault: Callback<PlaybackFault>,
}

impl ElementOutput {
    /// `on_fault` receives asynchronous play failures; the autoplay block
    /// arrives through the play-promise, after `start` has returned.
    #[must_use]
    pub const fn new(on_fault: Callback<PlaybackFault>) -> Self {
        Self { on_fault }
    }
}

/// One live `HtmlAudioElement`.
pub struct ElementHandle {
    element: HtmlAudioElement,
}

impl AudioOutput for ElementOutput {
    type Handle = ElementHandle;

    fn start(&mut self, source: &AudioSource) -> Result<ElementHandle, PlaybackFault> {
        let element = HtmlAudioElement::new_with_src(source.as_href())
            .map_err(|err| PlaybackFault::Failed(js_error_message(&err)))?;
        element.set_current_time(0.0);
        let promise = element
            .play()
            .map_err(|err| PlaybackFault::Failed(js_error_message(&err)))?;

        let on_fault = self.on_fault.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                on_fault.emit(classify_play_rejection(&err));
            }
        });
        Ok(ElementHandle { element })
    }
}

impl AudioHandle for ElementHandle {
    fn stop(&mut self) {
        let _ = self.element.pause();
        self.element.set_current_time(0.0);
    }
}

/// A `NotAllowedError` rejection means the browser wants a user gesture
/// first; everything else is a genuine playback failure.
fn classify_play_rejection(err: &wasm_bindgen::JsValue) -> PlaybackFault {
    let blocked = err
        .dyn_ref::<web_sys::DomException>()
        .is_some_and(|exception| exception.name() == "NotAllowedError");
    if blocked {
        PlaybackFault::Blocked
    } else {
        PlaybackFault::Failed(js_error_message(err))
    }
}
