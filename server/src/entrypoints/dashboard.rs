use std::sync::Arc;

use octolens_server::{
    chart::{ChartKind, ChartOptions},
    render::{Templates, Theme},
    search::SearchCoordinator,
};
use rocket::{
    form::Form,
    http::{Cookie, CookieJar},
    response::{content::RawHtml, Redirect},
    State,
};

#[derive(FromForm)]
pub struct SearchRequest {
    username: String,
}

#[get("/?<chart>&<grid>&<legend>")]
fn dashboard(
    chart: Option<ChartKind>,
    grid: Option<bool>,
    legend: Option<bool>,
    coordinator: &State<Arc<SearchCoordinator>>,
    templates: &State<Templates>,
    cookies: &CookieJar<'_>,
) -> RawHtml<String> {
    let options = ChartOptions::from_query(chart, grid, legend);
    let theme = Theme::from_cookie(cookies.get("theme").map(|cookie| cookie.value()));
    let state = coordinator.current();
    RawHtml(templates.render_dashboard(&state, &options, theme))
}

#[post("/search", data = "<request>")]
fn search(request: Form<SearchRequest>, coordinator: &State<Arc<SearchCoordinator>>) -> Redirect {
    let coordinator = coordinator.inner().clone();
    let username = request.username.clone();
    rocket::tokio::spawn(async move {
        coordinator.search(&username).await;
    });
    Redirect::to("/")
}

#[get("/theme?<mode>")]
fn set_theme(mode: Theme, cookies: &CookieJar<'_>) -> Redirect {
    cookies.add(
        Cookie::build(("theme", mode.as_str())).max_age(rocket::time::Duration::days(365)),
    );
    Redirect::to("/")
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing the dashboard", |rocket| async {
        let templates = Templates::load()
            .await
            .expect("Failed to load dashboard templates");
        rocket
            .manage(templates)
            .mount("/", rocket::routes![dashboard, search, set_theme])
    })
}
