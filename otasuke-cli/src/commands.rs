use std::path::Path;
use std::sync::Arc;

use otasuke_client::models::{ProjectFilter, UserRole};
use otasuke_client::{
    ApiClient, AuthSession, FileCredentialStore, Navigator, RegisterForm, TokenStore, Validate,
};
use tracing::{debug, info, warn};

use crate::{
    cli::{
        DirectOrdersCommand, NotificationsCommand, OrdersCommand, OutputFormat, ProjectsCommand,
        QuotesCommand, RoleArg,
    },
    config::AppConfig,
    error::{CliError, Result},
    output::{OutputManager, Render, Whoami, write_output},
};

/// Tells the user to sign in again once the stored session is gone.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, location: &str) {
        warn!(%location, "Session expired");
        eprintln!("Session expired. Sign in again with `otasuke login <email>`.");
    }
}

pub struct CommandExecutor {
    session: AuthSession,
    output: OutputManager,
}

impl CommandExecutor {
    pub fn new(
        config: &AppConfig,
        api_url: Option<&str>,
        credentials: Option<&Path>,
        format: OutputFormat,
    ) -> Result<Self> {
        let store = match credentials.or(config.credentials_path.as_deref()) {
            Some(path) => FileCredentialStore::open(path)?,
            None => FileCredentialStore::open_default()?,
        };
        debug!(path = %store.path().display(), "Using credentials file");

        let client = ApiClient::builder(config.client_config(api_url)?)
            .tokens(TokenStore::new(Arc::new(store)))
            .navigator(Arc::new(TerminalNavigator))
            .build()?;

        Ok(Self {
            session: AuthSession::new(client),
            output: OutputManager::new(format, config.colored),
        })
    }

    fn client(&self) -> &ApiClient {
        self.session.client()
    }

    fn print<T: Render>(&self, value: &T) -> Result<()> {
        write_output(&self.output.render(value)?)
    }

    fn print_message(&self, text: &str) -> Result<()> {
        write_output(&self.output.message(text)?)
    }

    fn require_credentials(&self) -> Result<()> {
        if self.client().tokens().has_access_token() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn.into())
        }
    }

    /// Load the signed-in user, failing when there is no usable session.
    async fn require_user(&self) -> Result<otasuke_client::models::UserResponse> {
        self.session
            .restore()
            .await?
            .ok_or_else(|| CliError::NotSignedIn.into())
    }

    pub async fn login(&self, email: &str, password: Option<String>) -> Result<()> {
        let password = match password {
            Some(password) => password,
            None => prompt_password("Password:")?,
        };

        let user = self.session.login(email, &password).await?;
        info!(user_id = %user.id, "Login complete");

        let mut message = format!("Signed in as {} ({})", user.email, user.role);
        if user.role == UserRole::Contractor && self.session.company().is_none() {
            message.push_str(". Register your company before posting projects");
        }
        self.print_message(&message)
    }

    pub async fn register(&self, email: &str, role: RoleArg, password: Option<String>) -> Result<()> {
        let (password, password_confirm) = match password {
            Some(password) => (password.clone(), password),
            None => (
                prompt_password("Password:")?,
                prompt_password("Confirm password:")?,
            ),
        };

        let form = RegisterForm {
            email: email.to_string(),
            password,
            password_confirm,
            role: role.into(),
        };
        form.validate()?;

        let user = self
            .session
            .register(&form.email, &form.password, form.role)
            .await?;
        self.print_message(&format!("Registered and signed in as {} ({})", user.email, user.role))
    }

    pub fn logout(&self) -> Result<()> {
        self.session.logout()?;
        self.print_message("Signed out")
    }

    pub async fn whoami(&self) -> Result<()> {
        let user = self.require_user().await?;
        self.print(&Whoami {
            user,
            company: self.session.company(),
        })
    }

    pub async fn projects(&self, action: ProjectsCommand) -> Result<()> {
        self.require_credentials()?;
        let projects = self.client().projects();

        match action {
            ProjectsCommand::List {
                status,
                company,
                specialty,
                location,
                page,
                per_page,
            } => {
                let filter = ProjectFilter {
                    status,
                    company_id: company,
                    specialty_id: specialty,
                    location,
                    page,
                    per_page,
                };
                self.print(&projects.list(&filter).await?)
            }
            ProjectsCommand::Show { id } => self.print(&projects.get(id).await?),
            ProjectsCommand::Quotes { id } => self.print(&projects.quotes(id).await?),
        }
    }

    pub async fn quotes(&self, action: QuotesCommand) -> Result<()> {
        self.require_credentials()?;
        let quotes = self.client().quotes();

        match action {
            QuotesCommand::Mine => self.print(&quotes.mine().await?),
            QuotesCommand::Accept { id } => self.print(&quotes.accept(id).await?),
            QuotesCommand::Reject { id } => self.print(&quotes.reject(id).await?),
        }
    }

    pub async fn orders(&self, action: OrdersCommand) -> Result<()> {
        self.require_credentials()?;
        let orders = self.client().orders();

        match action {
            OrdersCommand::List => self.print(&orders.list().await?),
            OrdersCommand::Show { id } => self.print(&orders.get(id).await?),
            OrdersCommand::Complete { id } => self.print(&orders.complete(id).await?),
        }
    }

    pub async fn notifications(&self, action: NotificationsCommand) -> Result<()> {
        self.require_credentials()?;
        let notifications = self.client().notifications();

        match action {
            NotificationsCommand::List { unread } => {
                self.print(&notifications.list(unread).await?)
            }
            NotificationsCommand::Read { id } => {
                notifications.mark_read(id).await?;
                self.print_message("Marked as read")
            }
            NotificationsCommand::ReadAll => {
                notifications.mark_all_read().await?;
                self.print_message("All notifications marked as read")
            }
        }
    }

    pub async fn direct_orders(&self, action: DirectOrdersCommand) -> Result<()> {
        self.require_credentials()?;
        let direct = self.client().direct_orders();

        let order = match action {
            DirectOrdersCommand::List { status } => {
                return self.print(&direct.list(status).await?);
            }
            DirectOrdersCommand::Show { id } => direct.get(id).await?,
            DirectOrdersCommand::Accept { id } => direct.accept(id).await?,
            DirectOrdersCommand::Decline { id, reason } => direct.decline(id, reason).await?,
            DirectOrdersCommand::Start { id } => direct.start(id).await?,
            DirectOrdersCommand::Complete { id } => direct.complete(id).await?,
            DirectOrdersCommand::Cancel { id } => direct.cancel(id).await?,
        };
        self.print(&order)
    }

    pub async fn dashboard(&self) -> Result<()> {
        let user = self.require_user().await?;
        let dashboard = self.client().dashboard();

        match user.role {
            UserRole::Contractor => self.print(&dashboard.contractor().await?),
            UserRole::Subcontractor => self.print(&dashboard.subcontractor().await?),
        }
    }
}

fn prompt_password(message: &str) -> Result<String> {
    #[cfg(feature = "interactive")]
    {
        inquire::Password::new(message)
            .without_confirmation()
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .prompt()
            .map_err(|e| CliError::Prompt(e.to_string()).into())
    }

    #[cfg(not(feature = "interactive"))]
    {
        let _ = message;
        Err(CliError::PasswordRequired.into())
    }
}
