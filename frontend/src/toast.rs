use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlTemplateElement};

const VISIBLE_MS: u32 = 4000;
const FADE_MS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

impl Tone {
    fn as_str(self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Error => "error",
        }
    }
}

/// Shows a transient notification. Uses the page's `#toastTemplate` when
/// there is one, otherwise a plain fixed-position box.
pub fn show_toast(message: &str, tone: Tone) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let (Some(toast), Some(body)) = (toast_element(&document), document.body()) else {
        return;
    };

    toast.set_text_content(Some(message));
    toast.dataset().set("tone", tone.as_str()).ok();

    if body.append_child(&toast).is_ok() {
        wasm_bindgen_futures::spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(VISIBLE_MS).await;
            let style = toast.style();
            style.set_property("opacity", "0").ok();
            style.set_property("transform", "translateY(20px)").ok();
            gloo_timers::future::TimeoutFuture::new(FADE_MS).await;
            toast.remove();
        });
    }
}

fn toast_element(document: &Document) -> Option<HtmlElement> {
    let from_template = document
        .get_element_by_id("toastTemplate")
        .and_then(|el| el.dyn_into::<HtmlTemplateElement>().ok())
        .and_then(|template| template.content().first_element_child())
        .and_then(|first| first.clone_node_with_deep(true).ok())
        .and_then(|node| node.dyn_into::<HtmlElement>().ok());
    if from_template.is_some() {
        return from_template;
    }

    let toast: HtmlElement = document.create_element("div").ok()?.unchecked_into();
    let style = toast.style();
    style.set_property("position", "fixed").ok();
    style.set_property("bottom", "20px").ok();
    style.set_property("left", "50%").ok();
    style.set_property("transform", "translateX(-50%)").ok();
    style.set_property("background", "rgba(0, 0, 0, 0.8)").ok();
    style.set_property("color", "#fff").ok();
    style.set_property("padding", "10px 20px").ok();
    style.set_property("border-radius", "4px").ok();
    style.set_property("z-index", "10000").ok();
    style.set_property("transition", "opacity 0.3s, transform 0.3s").ok();
    Some(toast)
}
