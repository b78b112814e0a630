//! Command dispatcher: turns parsed commands into state changes and
//! transcript entries.
//!
//! Every command appends exactly one transcript entry, except `clear` which
//! empties the transcript instead. State mutations happen only on the
//! success path of the branch that reports them, so a failed command leaves
//! navigation, ledger, and session untouched.

use std::collections::HashMap;

use crate::client::{ContentApi, Post};
use crate::command::{self, Command, VoteDirection};
use crate::nav::{NavigationState, SortMode, TimeFilter};
use crate::session::SessionManager;
use crate::transcript::Transcript;

const HELP_TEXT: &str = "\
Available Commands:
  help                      Show this help message
  clear                     Clear the terminal
  login -u <user> -p <pass> Login to Reddit account
  logout                    Logout from current session
  whoami                    Display current logged in user

  cd <subreddit>            Switch to specified subreddit
  ls                        List posts in current subreddit
  ls --sort=<option>        List posts with sorting option:
    Options:
      hot                   Hot posts (default)
      new                   New posts
      top                   Top posts
      rising                Rising posts
      controversial         Controversial posts

  ls --sort=top --time=<option>   List top posts with time filter:
    Options:
      day                   Posts from last 24 hours
      week                  Posts from last week
      month                 Posts from last month
      year                  Posts from last year
      all                   All time top posts

  --upvote <post_id>        Upvote a post
  --downvote <post_id>      Downvote a post

Example Usage:
  cd programming            Switch to r/programming subreddit
  ls --sort=top --time=week List top posts from this week
  --upvote abc123           Upvote post with ID abc123";

/// Whether a command produced an entry or reset the transcript.
#[derive(Debug, PartialEq, Eq)]
pub enum ExecOutcome {
    Executed,
    Cleared,
}

pub struct Dispatcher {
    nav: NavigationState,
    ledger: HashMap<String, VoteDirection>,
    transcript: Transcript,
    /// Posts from the most recent successful listing; votes resolve ids
    /// against this.
    last_listing: Vec<Post>,
    session: SessionManager,
    content: Box<dyn ContentApi>,
}

impl Dispatcher {
    pub fn new(session: SessionManager, content: Box<dyn ContentApi>) -> Self {
        Self {
            nav: NavigationState::default(),
            ledger: HashMap::new(),
            transcript: Transcript::new(),
            last_listing: Vec::new(),
            session,
            content,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn prompt(&self) -> String {
        self.nav.prompt_label()
    }

    pub fn current_user(&self) -> Option<&str> {
        self.session.current_user()
    }

    /// Runs one trimmed, non-empty input line to completion.
    pub async fn execute(&mut self, line: &str) -> ExecOutcome {
        let prompt = self.nav.prompt_label();
        let parsed = command::parse(line);

        if parsed == Command::Clear {
            self.transcript.clear();
            return ExecOutcome::Cleared;
        }

        let echo = match &parsed {
            Command::Login { .. } => command::mask_echo(line),
            _ => line.to_string(),
        };

        let output = self.run(parsed).await;
        self.transcript.push(prompt, echo, output);
        ExecOutcome::Executed
    }

    async fn run(&mut self, command: Command) -> String {
        match command {
            Command::Help => HELP_TEXT.to_string(),
            Command::Clear => unreachable!("clear is handled before dispatch"),
            Command::Cd { target } => self.run_cd(target),
            Command::Ls { sort, time } => self.run_ls(sort, time).await,
            Command::Vote {
                direction,
                verb,
                post_id,
            } => self.run_vote(direction, &verb, post_id).await,
            Command::Login { user, pass } => self.run_login(user, pass),
            Command::Logout => self.run_logout(),
            Command::Whoami => match self.session.current_user() {
                Some(name) => format!("Logged in as: {}", name),
                None => "Not logged in".to_string(),
            },
            Command::Unknown => {
                "Error: Unknown command. Type help for available commands.".to_string()
            }
        }
    }

    fn run_cd(&mut self, target: Option<String>) -> String {
        let Some(name) = target else {
            return "Error: Please specify a subreddit name. Usage: cd <subreddit>".to_string();
        };
        let output = format!("Changed directory to: /r/{}", name);
        self.nav.collection = Some(name);
        output
    }

    async fn run_ls(&mut self, sort: Option<SortMode>, time: Option<TimeFilter>) -> String {
        let Some(collection) = self.nav.collection.clone() else {
            return "Error: No subreddit selected. First select a subreddit.".to_string();
        };

        // Unset flags reuse the last-used values.
        let sort = sort.unwrap_or(self.nav.sort);
        let time = time.unwrap_or(self.nav.time);

        let posts = match self
            .content
            .list(&collection, sort, time, self.session.access_token())
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!("listing failed: {:#}", e);
                return "Error: Failed to fetch posts".to_string();
            }
        };

        self.nav.sort = sort;
        self.nav.time = time;

        let mut output = if sort.is_time_filtered() {
            format!("Listing posts from r/{} ({}, {}):", collection, sort, time)
        } else {
            format!("Listing posts from r/{} ({}):", collection, sort)
        };
        for post in &posts {
            let vote_status = match self.ledger.get(&post.id) {
                Some(direction) => format!(" [{}d]", direction.verb()),
                None => String::new(),
            };
            output.push_str(&format!(
                "\n[{}] {} (↑{}){}",
                post.id, post.title, post.score, vote_status
            ));
        }

        self.last_listing = posts;
        output
    }

    async fn run_vote(
        &mut self,
        direction: VoteDirection,
        verb: &str,
        post_id: Option<String>,
    ) -> String {
        if self.nav.collection.is_none() {
            return "Error: No subreddit selected. First select a subreddit.".to_string();
        }
        let Some(post_id) = post_id else {
            return format!("Error: Please provide a post ID. Usage: {} <post_id>", verb);
        };

        let Some(token) = self.session.access_token().map(String::from) else {
            return "Error: Must be logged in to vote".to_string();
        };

        let Some(post) = self.last_listing.iter().find(|p| p.id == post_id) else {
            return format!("Error: Post with ID {} not found", post_id);
        };
        let title = post.title.clone();

        match self.content.vote(&post_id, direction, &token).await {
            Ok(()) => {
                self.ledger.insert(post_id, direction);
                format!("Successfully {}d post: {}", direction.verb(), title)
            }
            Err(e) => {
                tracing::warn!("vote failed: {:#}", e);
                format!("Error: Failed to {} post", direction.verb())
            }
        }
    }

    fn run_login(&mut self, user: Option<String>, pass: Option<String>) -> String {
        if user.is_none() || pass.is_none() {
            return "Error: Missing required flags. Usage: login -u <username> -p <password>"
                .to_string();
        }

        // The typed credentials only satisfy the grammar; authentication is
        // the OAuth redirect.
        match self.session.initiate_login() {
            Ok(url) => format!(
                "Redirecting to Reddit for authentication...\n{}\nOpen the URL, authorize, then restart with: reddish --code <code> --state <state>",
                url
            ),
            Err(e) => {
                tracing::warn!("login initiation failed: {:#}", e);
                "Error: Failed to initiate login".to_string()
            }
        }
    }

    fn run_logout(&mut self) -> String {
        if !self.session.is_authenticated() {
            return "Error: Not logged in".to_string();
        }
        match self.session.logout() {
            Ok(()) => "Successfully logged out".to_string(),
            Err(e) => {
                tracing::warn!("logout failed: {:#}", e);
                "Error: Failed to log out".to_string()
            }
        }
    }
}
