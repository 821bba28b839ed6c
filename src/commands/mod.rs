mod ask;
pub mod channels;
mod clear;
mod disconnect;
mod help;
mod imagine;
mod models;
mod movie;
mod nowplaying;
mod pause;
mod ping;
mod play;
mod queue;
mod resume;
mod skip;
mod stop;
mod transcribe;
mod tts;

pub use ask::{converse, failure_message};

use crate::{Data, Error};

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        ask::ask(),
        ask::chat(),
        clear::clear(),
        ping::ping(),
        help::help(),
        imagine::imagine(),
        models::models(),
        models::setmodel(),
        channels::allowchannel(),
        channels::disallowchannel(),
        channels::clearchannels(),
        channels::channels(),
        tts::tts(),
        transcribe::transcribe(),
        movie::movie(),
        play::play(),
        pause::pause(),
        resume::resume(),
        skip::skip(),
        stop::stop(),
        queue::queue(),
        nowplaying::nowplaying(),
        nowplaying::np(),
        disconnect::disconnect(),
        disconnect::leave(),
    ]
}
