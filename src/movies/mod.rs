pub mod client;
pub mod embed;

pub use client::{Movie, MovieClient, MovieError};

/// One embeddable player page for a title.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamingLink {
    pub label: &'static str,
    pub url: String,
}

/// Player pages keyed by TMDB id, using the IMDb id where the host prefers it.
pub fn streaming_links(tmdb_id: u64, imdb_id: Option<&str>) -> Vec<StreamingLink> {
    let imdb_or_tmdb = imdb_id.map_or_else(|| tmdb_id.to_string(), str::to_string);
    let godrive = match imdb_id {
        Some(imdb) => format!("https://godriveplayer.com/player.php?imdb={imdb}"),
        None => format!("https://godriveplayer.com/player.php?tmdb={tmdb_id}"),
    };

    vec![
        StreamingLink {
            label: "VidSrc",
            url: format!("https://vidsrc.to/embed/movie/{imdb_or_tmdb}"),
        },
        StreamingLink {
            label: "VixSrc",
            url: format!("https://vixsrc.to/movie/{tmdb_id}"),
        },
        StreamingLink {
            label: "GoDrive Player",
            url: godrive,
        },
        StreamingLink {
            label: "Embed.su",
            url: format!("https://embed.su/embed/movie/{tmdb_id}"),
        },
        StreamingLink {
            label: "2Embed",
            url: format!("https://www.2embed.cc/embed/{imdb_or_tmdb}"),
        },
        StreamingLink {
            label: "VidFast",
            url: format!("https://vidfast.pro/movie/{tmdb_id}?autoPlay=true"),
        },
    ]
}
