//! HTML pages.
//!
//! Both pages are pure functions of their inputs. All dynamic text is
//! escaped by maud; the only raw output is the map stylesheet, built from
//! validated colours and alphanumeric codes.

use engine::{DEFAULT_COLOR, Dashboard, FALLBACK_COLOR};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const TITLE: &str = "Travel Tracker";

/// Inlines the world map, if one is served, so the page stylesheet can paint
/// it, and posts `/remove` for the clicked country.
const PAGE_SCRIPT: &str = r#"
const map = document.getElementById("map");
if (map) {
  fetch(map.dataset.src)
    .then((response) => (response.ok ? response.text() : ""))
    .then((svg) => {
      map.innerHTML = svg;
    })
    .catch(() => {});
}

document.querySelectorAll("button.remove").forEach((button) => {
  button.addEventListener("click", async () => {
    const body = new URLSearchParams({
      countryCode: button.dataset.code,
      userId: button.dataset.user,
    });
    const response = await fetch("/remove", { method: "POST", body });
    if (response.ok) {
      window.location.reload();
    }
  });
});
"#;

/// `color` if it is a `#rgb` or `#rrggbb` hex colour, the fallback otherwise.
fn css_color(color: &str) -> &str {
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid { color } else { FALLBACK_COLOR }
}

/// Rules painting every visited country of the world map.
fn map_stylesheet(countries: &[String], color: &str) -> String {
    let selectors: Vec<String> = countries
        .iter()
        .filter(|code| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|code| format!("#{code}"))
        .collect();
    if selectors.is_empty() {
        return String::new();
    }
    format!("{} {{ fill: {}; }}", selectors.join(", "), css_color(color))
}

fn layout(head_extra: Markup, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (TITLE) }
                link rel="stylesheet" href="/public/styles/main.css";
                (head_extra)
            }
            body { (body) }
        }
    }
}

/// The index page: user tabs, the visited countries of the current user and
/// the form adding a new one.
pub fn index(error: Option<&str>, dashboard: &Dashboard) -> Markup {
    let color = css_color(dashboard.color());
    let current_id = dashboard.current_user.as_ref().map(|user| user.id);

    let head = html! {
        style { (PreEscaped(map_stylesheet(&dashboard.countries, color))) }
    };

    let body = html! {
        header {
            h1 { (TITLE) }
        }
        @if let Some(error) = error {
            p.error role="alert" { (error) }
        }

        form.tabs action="/user" method="post" {
            @for user in &dashboard.users {
                button.tab.active[current_id == Some(user.id)]
                    type="submit"
                    name="user"
                    value=(user.id)
                    style={ "background-color: " (css_color(user.color())) } {
                    (user.name)
                }
            }
            button.tab type="submit" name="add" value="new" { "Add Family Member" }
        }

        h2.total-count { "Total Countries: " (dashboard.total()) }

        @match &dashboard.current_user {
            None => {
                p.empty { "No family members yet. Add one to start tracking countries." }
            }
            Some(user) => {
                form.add action="/add" method="post" {
                    input type="text" name="country" placeholder="Enter country name" autofocus;
                    button type="submit" style={ "background-color: " (color) } { "Add" }
                }

                ul.visited {
                    @for code in &dashboard.countries {
                        li {
                            span.code { (code) }
                            button.remove type="button" data-code=(code) data-user=(user.id)
                                aria-label={ "Remove " (code) } { "×" }
                        }
                    }
                }
            }
        }

        section.members {
            @for user in &dashboard.users {
                form.delete action={ "/delete/" (user.id) } method="post" {
                    button type="submit" { "Delete " (user.name) }
                }
            }
        }

        div id="map" data-src="/public/map.svg" {}
        script { (PreEscaped(PAGE_SCRIPT)) }
    };

    layout(head, body)
}

/// The form creating a new user.
pub fn new_user() -> Markup {
    let body = html! {
        h1 { "Add a new family member" }
        form.new-user action="/new" method="post" {
            label for="name" { "Name" }
            input id="name" type="text" name="name" required autofocus;
            label for="color" { "Colour" }
            input id="color" type="color" name="color" value=(DEFAULT_COLOR);
            button type="submit" { "Add" }
        }
        a href="/" { "Back" }
    };

    layout(html! {}, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::User;

    fn user(id: i32, name: &str, color: &str) -> User {
        User {
            id,
            name: name.to_string(),
            color: Some(color.to_string()),
        }
    }

    #[test]
    fn css_color_accepts_hex_only() {
        assert_eq!(css_color("#a1b2c3"), "#a1b2c3");
        assert_eq!(css_color("#fff"), "#fff");
        assert_eq!(css_color("red"), FALLBACK_COLOR);
        assert_eq!(css_color("#12345"), FALLBACK_COLOR);
        assert_eq!(css_color("#fff;}</style>"), FALLBACK_COLOR);
    }

    #[test]
    fn stylesheet_paints_visited_codes() {
        let css = map_stylesheet(&["FR".to_string(), "JP".to_string()], "#ff0000");
        assert_eq!(css, "#FR, #JP { fill: #ff0000; }");
        assert_eq!(map_stylesheet(&[], "#ff0000"), "");
        assert_eq!(map_stylesheet(&["<x>".to_string()], "#ff0000"), "");
    }

    #[test]
    fn empty_index_shows_empty_state() {
        let page = index(None, &Dashboard::default()).into_string();
        assert!(page.contains("No family members yet"));
        assert!(page.contains("Add Family Member"));
        assert!(page.contains("Total Countries: 0"));
        assert!(!page.contains(r#"action="/add""#));
    }

    #[test]
    fn index_lists_users_and_countries() {
        let alice = user(1, "Alice", "#ff0000");
        let bob = user(2, "<Bob>", "#00ff00");
        let dashboard = Dashboard {
            users: vec![alice.clone(), bob],
            current_user: Some(alice),
            countries: vec!["FR".to_string(), "KE".to_string()],
        };

        let page = index(Some("Country already exist"), &dashboard).into_string();
        assert!(page.contains("Total Countries: 2"));
        assert!(page.contains("Country already exist"));
        assert!(page.contains("&lt;Bob&gt;"));
        assert!(!page.contains("<Bob>"));
        assert!(page.contains(r#"action="/delete/2""#));
        assert!(page.contains(r#"data-code="KE""#));
        assert!(page.contains("#FR, #KE { fill: #ff0000; }"));
        assert!(page.contains(r#"class="tab active""#));
    }

    #[test]
    fn new_user_form_posts_to_new() {
        let page = new_user().into_string();
        assert!(page.contains(r#"action="/new""#));
        assert!(page.contains(r#"name="name""#));
        assert!(page.contains(DEFAULT_COLOR));
    }
}
