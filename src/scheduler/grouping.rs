//! Topic grouping
//!
//! Collapses raw scheduled posts into topics. Posts are partitioned by local
//! calendar day, sorted by time, then chained: a post joins the open topic
//! when its gap to the previous post is at most the grouping window, and a
//! gap exceeding the window opens a new topic. Chaining is transitive, so posts at
//! T, T+90m and T+170m form a single topic even though the outer pair is
//! more than two hours apart.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::models::{ScheduledPost, Topic};

use super::time::TimeContext;

/// Default grouping window in minutes
pub const DEFAULT_GROUPING_WINDOW_MINUTES: i64 = 120;

/// Groups posts into topics
#[derive(Debug, Clone)]
pub struct TopicGrouper {
    ctx: TimeContext,
    window: Duration,
}

impl TopicGrouper {
    /// Create a grouper for a timezone and window
    pub fn new(ctx: TimeContext, window: Duration) -> Self {
        Self { ctx, window }
    }

    /// Grouping window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Group posts into topics, ordered by day then time
    ///
    /// Input order does not matter. Ties on timestamp keep input order.
    pub fn group(&self, posts: &[ScheduledPost]) -> Vec<Topic> {
        let mut by_day: BTreeMap<NaiveDate, Vec<&ScheduledPost>> = BTreeMap::new();
        for post in posts {
            by_day
                .entry(self.ctx.local_date(post.published_at))
                .or_default()
                .push(post);
        }

        let mut topics = Vec::new();
        for (date, mut day_posts) in by_day {
            day_posts.sort_by_key(|p| p.published_at);

            let mut open: Option<Topic> = None;
            for post in day_posts {
                let joins = open
                    .as_ref()
                    .is_some_and(|topic| post.published_at - topic.last_time <= self.window);

                if joins {
                    if let Some(topic) = open.as_mut() {
                        topic.absorb(post.clone());
                    }
                    continue;
                }

                if let Some(done) = open.take() {
                    topics.push(done);
                }
                open = Some(Topic::start(date, post.clone()));
            }
            if let Some(done) = open {
                topics.push(done);
            }
        }

        tracing::debug!(posts = posts.len(), topics = topics.len(), "Grouped posts into topics");
        topics
    }
}

/// Index topics by local date
pub fn topics_by_day(topics: &[Topic]) -> BTreeMap<NaiveDate, Vec<&Topic>> {
    let mut map: BTreeMap<NaiveDate, Vec<&Topic>> = BTreeMap::new();
    for topic in topics {
        map.entry(topic.date).or_default().push(topic);
    }
    map
}
