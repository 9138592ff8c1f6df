#![feature(proc_macro_hygiene, decl_macro)]


#[macro_use] extern crate lazy_static;
#[macro_use] extern crate rocket;
#[macro_use] extern crate log;


mod logger;
mod view_state;
mod geolocation;
mod store;
mod map_sys;
mod report_form_sys;
mod report_list_sys;


use std::{env, env::VarError};
use std::path::{Path, PathBuf};
use rocket::response::NamedFile;


const STATIC_DIR: &'static str = "static/";
const TEST_DIR: &'static str = "test/";


#[get("/")]
fn index() -> &'static str {
    "Reportes Ciudadanos - Loja"
}

#[get("/<file..>")]
fn get_static_file(file: PathBuf) -> Option<NamedFile> {
    NamedFile::open(Path::new(STATIC_DIR).join(file)).ok()
}

#[get("/<file..>")]
fn get_test_file(file: PathBuf) -> Option<NamedFile> {
    NamedFile::open(Path::new(TEST_DIR).join(file)).ok()
}


fn main() {
    let rocket_env = env::var("ROCKET_ENV")
        .or_else(|_| -> Result<String, VarError> {
            if cfg!(debug_assertions) {
                Ok("development".into())
            }
            else {
                Ok("production".into())
            }
        }).unwrap();

    let _sentry = env::var("SENTRY_DSN").ok()
        .map(|dsn| sentry::init(dsn));

    log::set_boxed_logger(Box::new(sentry_log::SentryLogger::with_dest(logger::Logger)))
        .expect("Logger initialization failed");
    log::set_max_level(log::LevelFilter::Info);

    // Mount-time fetch for the map, then the click-to-form location channel.
    map_sys::init_map_sys(&*store::STORE, &geolocation::NoDevice);
    map_sys::set_click_handler(report_form_sys::set_selected_location);

    let dbg_envs = ["dev", "development", "staging", "stage"];
    if dbg_envs.iter().any(|&v| v == rocket_env) {
        // Debug
        rocket::ignite()
            .mount(&format!("/{}", TEST_DIR), routes![get_test_file])
    }
    else {
        // Release
        rocket::ignite()
    }
    .mount("/", routes![index])
    .mount(&format!("/{}", STATIC_DIR), routes![get_static_file])
    .mount("/", routes![
        map_sys::get_report_map,
        map_sys::post_map_click,
    ])
    .mount("/", routes![
        report_form_sys::get_report_form,
        report_form_sys::post_report,
    ])
    .mount("/", routes![
        report_list_sys::get_report_list,
    ])
    .launch();
}
