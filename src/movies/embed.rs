use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use super::{streaming_links, Movie};

const MOVIE_COLOR: u32 = 0x01B4E4;
const OVERVIEW_CHARS: usize = 300;

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{truncated}...")
    }
}

pub fn movie(movie: &Movie) -> CreateEmbed {
    let title = match movie.year() {
        Some(year) => format!("🎬 {} ({year})", movie.title),
        None => format!("🎬 {}", movie.title),
    };
    let overview = movie
        .overview
        .as_deref()
        .filter(|o| !o.trim().is_empty())
        .unwrap_or("No overview available.");

    let mut embed = CreateEmbed::new()
        .title(title)
        .url(movie.tmdb_url())
        .description(truncate_chars(overview, OVERVIEW_CHARS))
        .color(MOVIE_COLOR)
        .field("Rating", format!("⭐ {:.1}/10", movie.vote_average), true);

    if let Some(runtime) = movie.runtime.filter(|r| *r > 0) {
        embed = embed.field("Runtime", format!("{runtime} min"), true);
    }

    if !movie.genres.is_empty() {
        let genres: Vec<&str> = movie.genres.iter().take(3).map(|g| g.name.as_str()).collect();
        embed = embed.field("Genres", genres.join(", "), true);
    }

    let links: Vec<String> = streaming_links(movie.id, movie.imdb_id.as_deref())
        .into_iter()
        .map(|link| format!("[{}]({})", link.label, link.url))
        .collect();
    embed = embed.field("Watch", links.join(" · "), false);

    if let Some(poster) = movie.poster_url() {
        embed = embed.thumbnail(poster);
    }

    let footer = match &movie.imdb_id {
        Some(imdb) => format!("TMDB {} · IMDb {imdb}", movie.id),
        None => format!("TMDB {}", movie.id),
    };
    embed.footer(CreateEmbedFooter::new(footer))
}
