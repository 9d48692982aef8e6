//! Reactive data-access layer.
//!
//! Owns three live collections (categories, listings, users) and the
//! current-session profile, all exposed as `watch` channels fed by
//! background sync tasks. Mutations go straight to the store; the local
//! projections refresh when the store publishes the next snapshot, so
//! there is no read-after-write guarantee.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::watch;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{slugify, Category, Listing, ListingPatch, NewListing, Profile, Role};
use crate::store::{paths, Session, Snapshot, SqliteStore};

/// The reactive data-access layer over the document store.
pub struct DataLayer {
    store: Arc<SqliteStore>,
    config: Arc<Config>,
    categories: watch::Receiver<Vec<Category>>,
    listings: watch::Receiver<Vec<Listing>>,
    profiles: watch::Receiver<Vec<Profile>>,
    current: watch::Receiver<Option<Profile>>,
    /// Shared with the session task so sign-out can clear the profile
    /// immediately instead of waiting for the session notification.
    current_tx: Arc<watch::Sender<Option<Profile>>>,
}

impl DataLayer {
    /// Open the three collection subscriptions plus the session watcher
    /// and start the background sync tasks.
    pub async fn connect(store: Arc<SqliteStore>, config: Arc<Config>) -> Result<Self, AppError> {
        let categories = spawn_collection_sync::<Category>(
            store.subscribe(paths::CATEGORIES).await?,
            paths::CATEGORIES,
            |_| {},
        );
        let listings = spawn_collection_sync::<Listing>(
            store.subscribe(paths::POSTS).await?,
            paths::POSTS,
            |items| items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        );
        let profiles = spawn_collection_sync::<Profile>(
            store.subscribe(paths::USERS).await?,
            paths::USERS,
            |_| {},
        );

        let (current_tx, current) = spawn_session_sync(store.sessions(), profiles.clone());

        Ok(Self {
            store,
            config,
            categories,
            listings,
            profiles,
            current,
            current_tx,
        })
    }

    // ==================== REACTIVE STATE ====================

    pub fn categories(&self) -> Vec<Category> {
        self.categories.borrow().clone()
    }

    /// Listings, newest first. Equal timestamps carry no defined order.
    pub fn listings(&self) -> Vec<Listing> {
        self.listings.borrow().clone()
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles.borrow().clone()
    }

    pub fn current_profile(&self) -> Option<Profile> {
        self.current.borrow().clone()
    }

    pub fn watch_categories(&self) -> watch::Receiver<Vec<Category>> {
        self.categories.clone()
    }

    pub fn watch_listings(&self) -> watch::Receiver<Vec<Listing>> {
        self.listings.clone()
    }

    pub fn watch_profiles(&self) -> watch::Receiver<Vec<Profile>> {
        self.profiles.clone()
    }

    pub fn watch_current(&self) -> watch::Receiver<Option<Profile>> {
        self.current.clone()
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self.current.borrow().as_ref(),
            Some(Profile {
                role: Role::Admin,
                ..
            })
        )
    }

    /// Whether the current profile holds the publisher or admin role.
    pub fn is_publisher(&self) -> bool {
        matches!(
            self.current.borrow().as_ref().map(|p| p.role),
            Some(Role::Admin) | Some(Role::Publisher)
        )
    }

    pub fn can_edit(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .map(|p| p.can_edit())
            .unwrap_or(false)
    }

    pub fn admin_email(&self) -> &str {
        &self.config.admin_email
    }

    // ==================== CATEGORY OPERATIONS ====================

    /// Create a category and return the store-generated id.
    pub async fn create_category(&self, name: &str, icon: &str) -> Result<String, AppError> {
        let id = self
            .store
            .push(
                paths::CATEGORIES,
                json!({
                    "name": name,
                    "icon": icon,
                    "slug": slugify(name),
                }),
            )
            .await?;
        tracing::info!(id = %id, name, "Created category");
        Ok(id)
    }

    /// Delete a category. Listings referencing it are left untouched.
    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        self.store.remove(paths::CATEGORIES, id).await
    }

    // ==================== LISTING OPERATIONS ====================

    /// Create a listing authored by the current profile.
    ///
    /// Stamps the author id, a snapshot of the author's display name, the
    /// current time and a zero view counter.
    pub async fn create_listing(&self, new: NewListing) -> Result<Listing, AppError> {
        let Some(author) = self.current_profile() else {
            return Err(AppError::PermissionDenied(
                "Sign in to publish listings".to_string(),
            ));
        };
        if !author.can_edit() {
            return Err(AppError::PermissionDenied(format!(
                "{} is not allowed to publish listings",
                author.email
            )));
        }

        let mut listing = Listing {
            id: String::new(),
            title: new.title,
            description: new.description,
            url: new.url,
            image: new.image,
            category: new.category,
            author: author.id,
            author_name: author.name,
            created_at: Utc::now().timestamp_millis(),
            views: 0,
        };
        listing.id = self
            .store
            .push(paths::POSTS, serde_json::to_value(&listing)?)
            .await?;
        tracing::info!(id = %listing.id, title = %listing.title, "Created listing");
        Ok(listing)
    }

    /// Partially update a listing; absent fields are untouched.
    pub async fn update_listing(&self, id: &str, patch: ListingPatch) -> Result<(), AppError> {
        if !self.can_edit() {
            return Err(AppError::PermissionDenied(
                "Not allowed to update listings".to_string(),
            ));
        }
        if patch.is_empty() {
            return Ok(());
        }
        self.store.merge(paths::POSTS, id, patch.to_fields()).await
    }

    /// Delete a listing. Deletion carries no permission check.
    pub async fn delete_listing(&self, id: &str) -> Result<(), AppError> {
        self.store.remove(paths::POSTS, id).await
    }

    /// Bump a listing's view counter.
    pub async fn record_view(&self, id: &str) -> Result<(), AppError> {
        let views = self
            .listings
            .borrow()
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.views)
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", id)))?;
        self.store
            .merge(paths::POSTS, id, json!({ "views": views + 1 }))
            .await
    }

    // ==================== PROFILE OPERATIONS ====================

    /// Toggle a publisher's permission to create and update listings.
    pub async fn set_editable(&self, id: &str, editable: bool) -> Result<(), AppError> {
        self.store
            .merge(paths::USERS, id, json!({ "editable": editable }))
            .await
    }

    // ==================== AUTHENTICATION ====================

    /// Sign in. Store errors propagate unchanged.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        self.store.sign_in(email, password).await
    }

    /// Sign out and clear the current profile locally.
    pub fn sign_out(&self) {
        self.store.sign_out();
        self.current_tx.send_replace(None);
    }

    /// Register a new account and write its profile document.
    ///
    /// The configured admin email is always granted the admin role, no
    /// matter which role was requested. New profiles start editable.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        requested: Role,
    ) -> Result<Profile, AppError> {
        let session = self.store.create_credential(email, password).await?;

        let role = if email == self.config.admin_email {
            Role::Admin
        } else {
            requested
        };
        let profile = Profile {
            id: session.uid.clone(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            editable: Some(true),
        };
        self.store
            .write(paths::USERS, &session.uid, serde_json::to_value(&profile)?)
            .await?;
        tracing::info!(uid = %profile.id, role = role.as_str(), "Registered account");
        Ok(profile)
    }

    // ==================== BOOTSTRAP ====================

    /// Write the fixed demo categories and listings, attributed to the
    /// current profile or a synthetic system author.
    pub async fn seed_defaults(&self) -> Result<(), AppError> {
        let (author, author_name) = match self.current_profile() {
            Some(p) => (p.id, p.name),
            None => ("system".to_string(), "System".to_string()),
        };

        let technology = self.create_category("Technology", "💻").await?;
        let news = self.create_category("News", "📰").await?;

        let seeds = [
            (
                "WhatsApp Web",
                "https://web.whatsapp.com",
                "Use WhatsApp from the browser",
                &technology,
            ),
            (
                "MDN Web Docs",
                "https://developer.mozilla.org",
                "Documentation for web platform APIs",
                &technology,
            ),
            (
                "Hacker News",
                "https://news.ycombinator.com",
                "Tech and startup news aggregator",
                &news,
            ),
            (
                "BBC News",
                "https://www.bbc.com/news",
                "World news coverage",
                &news,
            ),
        ];

        // Strictly increasing timestamps keep the seeded order stable.
        let base = Utc::now().timestamp_millis();
        for (offset, (title, url, description, category)) in seeds.into_iter().enumerate() {
            self.store
                .push(
                    paths::POSTS,
                    json!({
                        "title": title,
                        "description": description,
                        "url": url,
                        "image": "",
                        "category": category,
                        "author": author.as_str(),
                        "authorName": author_name.as_str(),
                        "createdAt": base + offset as i64,
                        "views": 0,
                    }),
                )
                .await?;
        }
        tracing::info!("Seeded default categories and listings");
        Ok(())
    }
}

/// Parse a snapshot into typed records, skipping and logging anything
/// malformed rather than failing the subscription.
fn parse_snapshot<T: serde::de::DeserializeOwned>(collection: &str, snapshot: &Snapshot) -> Vec<T> {
    snapshot
        .iter()
        .filter_map(|(id, value)| match serde_json::from_value(value.clone()) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(collection, id = %id, "Skipping malformed record: {}", err);
                None
            }
        })
        .collect()
}

/// Drive a typed collection from a store subscription: full replace on
/// every snapshot, with a per-collection `finalize` pass (e.g. sorting).
fn spawn_collection_sync<T>(
    mut rx: watch::Receiver<Snapshot>,
    collection: &'static str,
    finalize: fn(&mut Vec<T>),
) -> watch::Receiver<Vec<T>>
where
    T: serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
{
    let snapshot = rx.borrow_and_update().clone();
    let mut initial = parse_snapshot(collection, &snapshot);
    finalize(&mut initial);

    let (tx, out) = watch::channel(initial);
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let mut items = parse_snapshot(collection, &snapshot);
            finalize(&mut items);
            if tx.send(items).is_err() {
                break;
            }
        }
        tracing::debug!(collection, "Collection sync task finished");
    });
    out
}

/// Derive the current profile from the session and the users collection.
///
/// A signed-in session without a stored profile gets a fallback profile
/// synthesized from the credential's basic fields.
fn spawn_session_sync(
    mut sessions: watch::Receiver<Option<Session>>,
    mut profiles: watch::Receiver<Vec<Profile>>,
) -> (
    Arc<watch::Sender<Option<Profile>>>,
    watch::Receiver<Option<Profile>>,
) {
    let (tx, out) = watch::channel(None);
    let tx = Arc::new(tx);

    let task_tx = tx.clone();
    tokio::spawn(async move {
        loop {
            let session = sessions.borrow_and_update().clone();
            let current = session.map(|s| resolve_profile(&s, &profiles.borrow_and_update()));
            task_tx.send_replace(current);

            tokio::select! {
                changed = sessions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = profiles.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Session sync task finished");
    });

    (tx, out)
}

fn resolve_profile(session: &Session, profiles: &[Profile]) -> Profile {
    if let Some(profile) = profiles.iter().find(|p| p.id == session.uid) {
        return profile.clone();
    }
    // Profile not provisioned yet: fall back to the credential's fields.
    let name = session
        .email
        .split('@')
        .next()
        .unwrap_or(&session.email)
        .to_string();
    Profile {
        id: session.uid.clone(),
        name,
        email: session.email.clone(),
        role: Role::User,
        editable: None,
    }
}
