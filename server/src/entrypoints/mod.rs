use rocket::fairing::AdHoc;

pub mod dashboard;

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket.attach(dashboard::stage())
    })
}
