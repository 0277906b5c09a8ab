use courier_core::Template;
use courier_provider::IntegrationError;
use serde_json::{Map, Value};

/// Subject and bodies of a template after substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Fill `template` with `template_data`, a JSON object.
///
/// Every `{{key}}` placeholder is replaced by the value stored under `key`.
/// String values are inserted as-is; numbers, booleans, `null` and nested
/// values are inserted as their JSON text. Placeholders without a matching
/// key are left untouched.
///
/// # Examples
///
/// ```
/// use courier_core::Template;
/// use courier_email::render::render_template;
///
/// let template = Template::new("greeting", "Hi {{name}}", "<p>Hi</p>", "Hi {{name}}, {{name}}!").unwrap();
/// let rendered = render_template(&template, r#"{"name": "Bob"}"#).unwrap();
/// assert_eq!(rendered.text_body, "Hi Bob, Bob!");
/// ```
pub fn render_template(
    template: &Template,
    template_data: &str,
) -> Result<RenderedTemplate, IntegrationError> {
    let data = parse_data(template_data)?;
    Ok(RenderedTemplate {
        subject: substitute(template.subject(), &data),
        html_body: substitute(template.html_body(), &data),
        text_body: substitute(template.text_body(), &data),
    })
}

fn parse_data(template_data: &str) -> Result<Map<String, Value>, IntegrationError> {
    match serde_json::from_str(template_data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(IntegrationError::Serialization(format!(
            "template data must be a JSON object, got {other}"
        ))),
        Err(e) => Err(IntegrationError::Serialization(e.to_string())),
    }
}

/// Replace every `{{key}}` in `input` with its value from `data`.
///
/// Runs in one left-to-right pass, so inserted values are never scanned for
/// placeholders themselves.
pub fn substitute(input: &str, data: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let value = tail
            .find("}}")
            .and_then(|end| data.get(&tail[..end]).map(|value| (end, value)));
        match value {
            Some((end, Value::String(s))) => {
                out.push_str(s);
                rest = &tail[end + 2..];
            }
            Some((end, other)) => {
                out.push_str(&other.to_string());
                rest = &tail[end + 2..];
            }
            // Not a known placeholder: keep one brace and rescan after it.
            None => {
                out.push('{');
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn template(text: &str) -> Template {
        Template::new("greeting", "Hello {{name}}", "<p>{{name}}</p>", text).unwrap()
    }

    #[test]
    fn replaces_every_occurrence() {
        let rendered =
            render_template(&template("Hi {{name}}, {{name}}!"), r#"{"name":"Bob"}"#).unwrap();
        assert_eq!(rendered.text_body, "Hi Bob, Bob!");
        assert_eq!(rendered.subject, "Hello Bob");
        assert_eq!(rendered.html_body, "<p>Bob</p>");
    }

    #[test]
    fn non_string_values_use_json_text() {
        let rendered = render_template(
            &template("{{count}} items, paid: {{paid}}, note: {{note}}"),
            r#"{"count": 3, "paid": true, "note": null}"#,
        )
        .unwrap();
        assert_eq!(rendered.text_body, "3 items, paid: true, note: null");
    }

    #[test]
    fn keys_are_case_sensitive_and_unknown_placeholders_survive() {
        let data = json!({"Name": "Bob"});
        let Value::Object(map) = data else {
            unreachable!()
        };
        assert_eq!(substitute("{{name}} / {{Name}}", &map), "{{name}} / Bob");
    }

    #[test]
    fn inserted_values_stay_literal() {
        let data = json!({"greeting": "{{name}}", "name": "Bob"});
        let Value::Object(map) = data else {
            unreachable!()
        };
        assert_eq!(substitute("{{greeting}} {{name}}", &map), "{{name}} Bob");
    }

    #[test]
    fn extra_braces_and_unclosed_placeholders() {
        let data = json!({"name": "Bob"});
        let Value::Object(map) = data else {
            unreachable!()
        };
        assert_eq!(substitute("{{{name}}}", &map), "{Bob}");
        assert_eq!(substitute("Hi {{name", &map), "Hi {{name");
        assert_eq!(substitute("{{}} {{name}}", &map), "{{}} Bob");
    }

    #[test]
    fn values_are_not_escaped() {
        let rendered =
            render_template(&template("{{html}}"), r#"{"html":"<b>&</b>"}"#).unwrap();
        assert_eq!(rendered.text_body, "<b>&</b>");
    }

    #[test]
    fn non_object_data_is_rejected() {
        let err = render_template(&template("x"), "[1, 2]").unwrap_err();
        assert!(matches!(err, IntegrationError::Serialization(_)));

        let err = render_template(&template("x"), "not json").unwrap_err();
        assert!(matches!(err, IntegrationError::Serialization(_)));
    }
}
