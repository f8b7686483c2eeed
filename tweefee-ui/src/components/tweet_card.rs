//! Tweet Card Component
//!
//! Avatar, author, date and autolinked text of one tweet.

use leptos::*;

use crate::feed::item::{hashtag_url, profile_url};
use crate::feed::FeedItem;
use crate::format::{autolink, format_date, Segment};

#[component]
pub fn TweetCard(item: FeedItem) -> impl IntoView {
    let profile = item.profile_url();
    let status = item.status_url();
    let date = format_date(&item.date);
    let segments = autolink(&item.content, &item.entities.urls);

    view! {
        <div class="tweet">
            <a href=profile.clone() target="_blank">
                <img class="avatar" src=item.user.avatar_url alt="" />
            </a>
            <div class="meta">
                <a class="fullname" href=profile target="_blank">
                    {item.user.full_name}
                    " "
                    <span class="handle">"@" {item.user.handle}</span>
                </a>
                <a class="date" href=status target="_blank">{date}</a>
            </div>
            <p class="text">
                {segments.into_iter().map(render_segment).collect_view()}
            </p>
        </div>
    }
}

fn render_segment(segment: Segment) -> View {
    match segment {
        Segment::Text(text) => text.into_view(),
        Segment::Link { href, text, title } => view! {
            <a class="tweet-url" href=href title=title target="_blank" rel="nofollow noopener">
                {text}
            </a>
        }
        .into_view(),
        Segment::Mention(handle) => view! {
            <a class="tweet-url username" href=profile_url(&handle) target="_blank">
                "@" {handle}
            </a>
        }
        .into_view(),
        Segment::Hashtag(tag) => view! {
            <a class="tweet-url hashtag" href=hashtag_url(&tag) target="_blank">
                "#" {tag}
            </a>
        }
        .into_view(),
    }
}
