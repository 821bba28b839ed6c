use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::imaging::{ImageBatch, ImageCandidate};
use crate::music::Song;

const QUEUE_PAGE_SIZE: usize = 10;

pub fn now_playing(song: &Song) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(format!("[{}]({})", song.title, song.url))
        .color(0x1DB954);

    if let Some(ref dur) = song.duration {
        embed = embed.field("Duration", dur, true);
    }

    embed.field("Requested by", &song.requester, true)
}

pub fn added_to_queue(song: &Song, position: usize) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("✅ Added to Queue")
        .description(format!("[{}]({})", song.title, song.url))
        .color(0x5865F2);

    if let Some(ref dur) = song.duration {
        embed = embed.field("Duration", dur, true);
    }

    embed.field("Position", format!("#{position}"), true)
}

pub fn queue_list(current: Option<&Song>, songs: &[Song], page: usize) -> CreateEmbed {
    let total_pages = songs.len().div_ceil(QUEUE_PAGE_SIZE).max(1);
    let page = page.clamp(1, total_pages);

    let mut description = String::new();

    if let Some(song) = current {
        description.push_str(&format!(
            "**Now playing:** [{}]({}){}\n\n",
            song.title,
            song.url,
            song.duration
                .as_ref()
                .map_or(String::new(), |d| format!(" `{d}`"))
        ));
    }

    if songs.is_empty() {
        description.push_str("The queue is empty.");
    } else {
        let start = (page - 1) * QUEUE_PAGE_SIZE;
        let end = (start + QUEUE_PAGE_SIZE).min(songs.len());

        for (i, song) in songs[start..end].iter().enumerate() {
            let dur = song
                .duration
                .as_ref()
                .map_or(String::new(), |d| format!(" `{d}`"));
            description.push_str(&format!(
                "**{}.** [{}]({}){dur}\n",
                start + i + 1,
                song.title,
                song.url
            ));
        }
    }

    CreateEmbed::new()
        .title(format!("📋 Queue ({page}/{total_pages})"))
        .description(description)
        .color(0x5865F2)
        .footer(CreateEmbedFooter::new(format!("{} song(s) waiting", songs.len())))
}

/// One embed per candidate, pointing at its uploaded attachment.
pub fn generated_image(candidate: &ImageCandidate, prompt: &str, model: &str) -> CreateEmbed {
    let mut title: String = prompt.chars().take(200).collect();
    if prompt.chars().count() > 200 {
        title.push_str("...");
    }
    CreateEmbed::new()
        .title(title)
        .color(0x9B59B6)
        .field("Provider", &candidate.source_provider, true)
        .field("Model", model, true)
        .field("Size", format!("{:.1} KiB", candidate.size_bytes as f64 / 1024.0), true)
        .attachment(candidate.file_name())
}

pub fn image_failures(batch: &ImageBatch) -> Option<String> {
    if batch.failures.is_empty() {
        return None;
    }
    let names: Vec<&str> = batch.failures.iter().map(|f| f.provider.as_str()).collect();
    Some(format!("Failed providers: {}", names.join(", ")))
}

pub fn info(title: &str, message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(message)
        .color(0x5865F2)
}

pub fn error(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(message)
        .color(0xED4245)
}
