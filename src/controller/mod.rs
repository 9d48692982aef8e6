//! View controller.
//!
//! Holds transient UI state (active screen, form buffers, search and
//! filter text, selection) and maps user actions onto the data layer.
//! Required-field validation lives here, not in the data layer.

use std::sync::Arc;

use crate::data::DataLayer;
use crate::errors::AppError;
use crate::models::{Listing, ListingPatch, NewListing, Profile, Role};

/// Active application screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Browse,
    Detail,
    Submit,
    MyListings,
    Admin,
    Login,
    Register,
}

/// Category filter applied to the browse screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Category(String),
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            role: Role::User,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: String,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    pub icon: String,
}

/// UI controller over the reactive data layer.
pub struct ViewController {
    data: Arc<DataLayer>,
    pub screen: Screen,
    pub search: String,
    pub filter: CategoryFilter,
    /// Listing shown on the detail screen.
    pub selected: Option<String>,
    /// Listing currently being edited on the submit screen.
    pub editing: Option<String>,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub listing_form: ListingForm,
    pub category_form: CategoryForm,
}

impl ViewController {
    pub fn new(data: Arc<DataLayer>) -> Self {
        Self {
            data,
            screen: Screen::Browse,
            search: String::new(),
            filter: CategoryFilter::All,
            selected: None,
            editing: None,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            listing_form: ListingForm::default(),
            category_form: CategoryForm::default(),
        }
    }

    // ==================== NAVIGATION ====================

    /// Switch screens, dropping any in-progress edit and form content
    /// belonging to the screen being left.
    pub fn go_to(&mut self, screen: Screen) {
        if self.screen == Screen::Submit && screen != Screen::Submit {
            self.listing_form = ListingForm::default();
            self.editing = None;
        }
        if self.screen == Screen::Detail && screen != Screen::Detail {
            self.selected = None;
        }
        self.screen = screen;
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    // ==================== DERIVED VIEWS ====================

    /// Listings whose title or author name contains the search text
    /// (case-insensitive) and whose category matches the filter.
    pub fn filtered_listings(&self) -> Vec<Listing> {
        let needle = self.search.to_lowercase();
        self.data
            .listings()
            .into_iter()
            .filter(|listing| {
                let matches_search = needle.is_empty()
                    || listing.title.to_lowercase().contains(&needle)
                    || listing.author_name.to_lowercase().contains(&needle);
                let matches_filter = match &self.filter {
                    CategoryFilter::All => true,
                    CategoryFilter::Category(id) => &listing.category == id,
                };
                matches_search && matches_filter
            })
            .collect()
    }

    /// Listings authored by the current profile.
    pub fn my_listings(&self) -> Vec<Listing> {
        let Some(current) = self.data.current_profile() else {
            return Vec::new();
        };
        self.data
            .listings()
            .into_iter()
            .filter(|listing| listing.author == current.id)
            .collect()
    }

    /// All profiles holding the publisher role, for admin management.
    pub fn publishers(&self) -> Vec<Profile> {
        self.data
            .profiles()
            .into_iter()
            .filter(|profile| profile.role == Role::Publisher)
            .collect()
    }

    // ==================== ACTIONS ====================

    /// Show a listing's detail view and record the view, best effort.
    pub async fn open_listing(&mut self, id: &str) {
        self.selected = Some(id.to_string());
        self.screen = Screen::Detail;
        if let Err(err) = self.data.record_view(id).await {
            tracing::debug!(id, "View not recorded: {}", err);
        }
    }

    /// Load an existing listing into the submit form for editing.
    pub fn start_edit(&mut self, id: &str) -> Result<(), AppError> {
        let listing = self
            .data
            .listings()
            .into_iter()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", id)))?;
        self.listing_form = ListingForm {
            title: listing.title,
            description: listing.description,
            url: listing.url,
            image: listing.image,
            category: listing.category,
        };
        self.editing = Some(id.to_string());
        self.screen = Screen::Submit;
        Ok(())
    }

    /// Create or update a listing from the submit form.
    pub async fn submit_listing(&mut self) -> Result<(), AppError> {
        let form = &self.listing_form;
        if form.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if form.url.trim().is_empty() {
            return Err(AppError::Validation("Link URL is required".to_string()));
        }
        if form.category.trim().is_empty() {
            return Err(AppError::Validation("Pick a category".to_string()));
        }

        match self.editing.clone() {
            Some(id) => {
                let patch = ListingPatch {
                    title: Some(form.title.clone()),
                    description: Some(form.description.clone()),
                    url: Some(form.url.clone()),
                    image: Some(form.image.clone()),
                    category: Some(form.category.clone()),
                };
                self.data.update_listing(&id, patch).await?;
            }
            None => {
                self.data
                    .create_listing(NewListing {
                        title: form.title.clone(),
                        description: form.description.clone(),
                        url: form.url.clone(),
                        image: form.image.clone(),
                        category: form.category.clone(),
                    })
                    .await?;
            }
        }

        self.listing_form = ListingForm::default();
        self.editing = None;
        self.screen = Screen::MyListings;
        Ok(())
    }

    pub async fn delete_listing(&self, id: &str) -> Result<(), AppError> {
        self.data.delete_listing(id).await
    }

    /// Create a category from the category form.
    pub async fn submit_category(&mut self) -> Result<String, AppError> {
        let form = &self.category_form;
        if form.name.trim().is_empty() {
            return Err(AppError::Validation("Category name is required".to_string()));
        }
        if form.icon.trim().is_empty() {
            return Err(AppError::Validation("Category icon is required".to_string()));
        }
        let id = self.data.create_category(&form.name, &form.icon).await?;
        self.category_form = CategoryForm::default();
        Ok(id)
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        self.data.delete_category(id).await
    }

    pub async fn set_publisher_editable(&self, id: &str, editable: bool) -> Result<(), AppError> {
        self.data.set_editable(id, editable).await
    }

    // ==================== AUTH ACTIONS ====================

    /// Sign in from the login form.
    ///
    /// When no account exists for the configured admin email, that email
    /// is self-provisioned as an admin account before reporting failure.
    pub async fn submit_login(&mut self) -> Result<(), AppError> {
        let email = self.login_form.email.trim().to_string();
        let password = self.login_form.password.clone();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        match self.data.sign_in(&email, &password).await {
            Ok(_) => {}
            Err(AppError::CredentialNotFound(_)) if email == self.data.admin_email() => {
                tracing::info!(email = %email, "Bootstrapping admin account");
                self.data
                    .register("Administrator", &email, &password, Role::Admin)
                    .await?;
            }
            Err(err) => return Err(err),
        }

        self.login_form = LoginForm::default();
        self.screen = Screen::Browse;
        Ok(())
    }

    /// Register from the registration form and land on the browse screen.
    pub async fn submit_register(&mut self) -> Result<(), AppError> {
        let form = self.register_form.clone();
        if form.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if form.email.trim().is_empty() || form.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        self.data
            .register(&form.name, form.email.trim(), &form.password, form.role)
            .await?;

        self.register_form = RegisterForm::default();
        self.screen = Screen::Browse;
        Ok(())
    }

    pub fn sign_out(&mut self) {
        self.data.sign_out();
        self.screen = Screen::Browse;
    }
}
