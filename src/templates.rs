//! Template engine setup and the rendering contract for callback pages.
//!
//! Templates are compiled into the binary so the tool works from any working
//! directory. The callback template receives exactly the fields of the
//! rendering contract: success flag, authorization code, state, error type,
//! error description, and a timestamp. Tera's autoescaping applies to all
//! caller-supplied values.

use tera::Tera;

use crate::error::AppError;

/// Initialize the Tera template engine with the embedded templates.
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("index.html", include_str!("../templates/index.html")),
        ("callback.html", include_str!("../templates/callback.html")),
    ])?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_compile() {
        let tera = init_templates().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        assert!(names.contains(&"index.html"));
        assert!(names.contains(&"callback.html"));
    }

    #[test]
    fn callback_template_escapes_html() {
        let tera = init_templates().unwrap();
        let mut context = tera::Context::new();
        context.insert("success", &true);
        context.insert("auth_code", "<script>alert(1)</script>");
        context.insert("state", &Option::<String>::None);
        context.insert("timestamp", "2026-01-01 00:00:00");

        let html = tera.render("callback.html", &context).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
