use std::{env, fs, path::Path};

use ts_rs::TS;

fn generate_types_content() -> String {
    // Types shared with the admin pages
    let header = "// This file was generated by `cargo run --bin generate_types`. Do not edit by hand.";
    let decls = [
        db::models::station::Station::decl(),
        db::models::station::CreateStation::decl(),
        db::models::line::Line::decl(),
        db::models::line::LineWithStations::decl(),
        db::models::line::CreateLine::decl(),
        db::models::line::UpdateLine::decl(),
        db::models::section::Section::decl(),
        db::models::section::CreateSection::decl(),
        services::services::line_sections::CascadeResult::decl(),
        services::services::line_sections::LineCascadeOutcome::decl(),
        server::error::ApiError::decl(),
        utils::response::ApiResponse::<()>::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|decl| {
            let trimmed = decl.trim_start();
            if trimmed.starts_with("export") {
                trimmed.to_string()
            } else {
                format!("export {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{header}\n\n{body}\n")
}

fn main() {
    let check_mode = env::args().any(|arg| arg == "--check");
    let shared_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../shared");
    let types_path = shared_path.join("types.ts");
    let generated = generate_types_content();

    if check_mode {
        let current = fs::read_to_string(&types_path).unwrap_or_default();
        if current == generated {
            println!("shared/types.ts is up to date.");
            std::process::exit(0);
        }
        eprintln!("shared/types.ts is out of date. Run `cargo run --bin generate_types`.");
        std::process::exit(1);
    }

    if let Err(e) = fs::create_dir_all(&shared_path).and_then(|_| fs::write(&types_path, generated)) {
        eprintln!("Failed to write {}: {e}", types_path.display());
        std::process::exit(1);
    }
    println!("Wrote {}", types_path.display());
}
