//! Feed List Component
//!
//! Keyed list over the feed signal. Reordering and eviction in
//! [`FeedState`] move or drop the matching card nodes.

use leptos::*;

use super::TweetCard;
use crate::feed::{FeedItem, FeedState};

#[component]
pub fn FeedList(feed: RwSignal<FeedState>) -> impl IntoView {
    view! {
        <div class="tweefeed-list">
            <For
                each=move || feed.with(|f| f.items().cloned().collect::<Vec<_>>())
                key=|item: &FeedItem| item.id.clone()
                children=move |item: FeedItem| view! { <TweetCard item=item /> }
            />
        </div>
    }
}
