use super::ui;
use crate::core::movie::{Movie, MovieProvider, MovieSearchPage};
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(
    movie_provider: &(dyn MovieProvider + Send + Sync),
    title: &str,
    page: u32,
) -> Result<()> {
    let pb = ui::new_spinner(&format!("Searching movies for \"{title}\"..."));
    let outcome = movie_provider.search(title, page).await;
    pb.finish_and_clear();

    match outcome {
        Ok(results) => display_page(title, &results),
        Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
    }

    Ok(())
}

fn display_page(title: &str, page: &MovieSearchPage) {
    if page.movies.is_empty() {
        println!("No movies found for \"{title}\".");
        return;
    }
    if page.movies.len() == 1 && page.total_results == 1 {
        display_movie(&page.movies[0]);
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Title"),
        ui::header_cell("Year"),
        ui::header_cell("IMDb ID"),
    ]);
    for movie in &page.movies {
        table.add_row(vec![
            Cell::new(&movie.title),
            Cell::new(&movie.year),
            Cell::new(&movie.imdb_id),
        ]);
    }
    println!("{table}");
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Page {} of {} ({} movies)",
                page.page,
                page.total_pages(),
                page.total_results
            ),
            ui::StyleType::Subtle
        )
    );
}

fn display_movie(movie: &Movie) {
    println!(
        "{}",
        ui::style_text(&format!("{} ({})", movie.title, movie.year), ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.add_row(vec![ui::header_cell("IMDb ID"), Cell::new(&movie.imdb_id)]);
    table.add_row(vec![ui::header_cell("Type"), Cell::new(&movie.kind)]);
    table.add_row(vec![
        ui::header_cell("Poster"),
        ui::format_optional_cell(movie.poster_url.as_deref(), |url| url.to_string()),
    ]);
    println!("{table}");
}
