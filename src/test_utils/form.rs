use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
fn must_get_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    let selector = Selector::parse(&format!("input[name='{name}']")).unwrap();

    form.select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No input named {name:?}"))
}

/// Assert `form` is a plain HTML form posting to `endpoint`.
#[track_caller]
pub(crate) fn assert_form_action(form: &ElementRef<'_>, endpoint: &str) {
    let form = form.value();

    assert_eq!(form.attr("method"), Some("post"));
    assert_eq!(form.attr("action"), Some(endpoint));
}

/// Assert `form` has a required input called `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_get_input(form, name);

    assert_eq!(input.value().attr("type"), Some(type_), "type of {name:?}");
    assert!(
        input.value().attr("required").is_some(),
        "input {name:?} should be required"
    );
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_input(form, name);

    assert_eq!(input.value().attr("type"), Some(type_), "type of {name:?}");
    assert_eq!(
        input.value().attr("value").unwrap_or_default(),
        value,
        "value of {name:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let button = form
        .select(&Selector::parse("button[type=submit]").unwrap())
        .next()
        .expect("No submit button found");

    assert_eq!(button.text().collect::<String>().trim(), text);
}

/// Assert the form shows exactly `want_error_messages`, in order.
#[track_caller]
pub(crate) fn assert_form_error_messages(form: &ElementRef<'_>, want_error_messages: &[&str]) {
    let selector = Selector::parse("p.text-red-500").unwrap();
    let got_error_messages = form
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_owned())
        .collect::<Vec<_>>();

    assert_eq!(want_error_messages, got_error_messages);
}
