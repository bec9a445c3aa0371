use eventline::{Tooltip, TooltipContent};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, MouseEvent};

/// The page's single tooltip panel, created on first hover and reused.
pub struct TooltipView {
    model: Tooltip,
    element: Option<HtmlElement>,
}

impl TooltipView {
    pub fn new(offset: (f64, f64)) -> Self {
        Self {
            model: Tooltip::new(offset),
            element: None,
        }
    }

    fn element(&mut self, document: &Document) -> Result<HtmlElement, JsValue> {
        if let Some(el) = self.element.as_ref() {
            return Ok(el.clone());
        }
        let el: HtmlElement = document.create_element("div")?.dyn_into()?;
        el.set_class_name("tooltip");
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        body.append_child(&el)?;
        self.element = Some(el.clone());
        Ok(el)
    }

    pub fn show(
        &mut self,
        document: &Document,
        event: &MouseEvent,
        content: TooltipContent,
    ) -> Result<(), JsValue> {
        let pointer = (f64::from(event.page_x()), f64::from(event.page_y()));
        self.model.show(content, pointer);
        self.sync(document)
    }

    pub fn hide(&mut self) -> Result<(), JsValue> {
        self.model.hide();
        if let Some(el) = self.element.as_ref() {
            el.style()
                .set_property("opacity", &self.model.opacity().to_string())?;
        }
        Ok(())
    }

    fn sync(&mut self, document: &Document) -> Result<(), JsValue> {
        let el = self.element(document)?;
        let (left, top) = self.model.position();
        let style = el.style();
        style.set_property("left", &format!("{left}px"))?;
        style.set_property("top", &format!("{top}px"))?;
        if let Some(content) = self.model.content() {
            el.set_inner_html(&content.to_html());
        }
        style.set_property("opacity", &self.model.opacity().to_string())?;
        Ok(())
    }
}
