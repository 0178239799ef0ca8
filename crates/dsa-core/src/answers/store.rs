//! Sled-backed answer store: one tree per identity variant plus the question mirror.

use super::{ActorRecord, CategoryAnswers};
use crate::error::CoreResult;
use crate::questions::QuestionBank;
use crate::shared::ActorIdentity;
use sled::{Db, IVec, Tree};
use std::path::Path;
use uuid::Uuid;

const USERS_TREE: &str = "users";
const SESSIONS_TREE: &str = "sessions";
const QUESTIONS_TREE: &str = "questions";

/// Store of [`ActorRecord`]s keyed by actor id.
///
/// Every record update is a compare-and-swap on the actor's key, so concurrent
/// answers for the same actor never overwrite each other. Each mutation is
/// flushed to disk before returning.
pub struct AnswerStore {
    db: Db,
    users: Tree,
    sessions: Tree,
    questions: Tree,
}

impl AnswerStore {
    /// Opens or creates the answer DB at the given path.
    pub fn open_path<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let db = sled::open(path)?;
        let users = db.open_tree(USERS_TREE)?;
        let sessions = db.open_tree(SESSIONS_TREE)?;
        let questions = db.open_tree(QUESTIONS_TREE)?;
        Ok(Self {
            db,
            users,
            sessions,
            questions,
        })
    }

    fn tree_for(&self, actor: &ActorIdentity) -> (&Tree, &'static str) {
        match actor {
            ActorIdentity::External(_) => (&self.users, USERS_TREE),
            ActorIdentity::Generated(_) => (&self.sessions, SESSIONS_TREE),
        }
    }

    /// Classifies a bare id from a URL path. Issued session ids win over user ids.
    pub fn resolve(&self, id: &str) -> CoreResult<ActorIdentity> {
        if self.sessions.contains_key(id.as_bytes())? {
            Ok(ActorIdentity::Generated(id.to_string()))
        } else {
            Ok(ActorIdentity::External(id.to_string()))
        }
    }

    /// Creates an empty record for `actor` unless one exists. Returns true if created.
    pub fn ensure_actor(&self, actor: &ActorIdentity) -> CoreResult<bool> {
        let (tree, tree_name) = self.tree_for(actor);
        let empty = ActorRecord::default().to_bytes()?;
        let created = tree
            .compare_and_swap(actor.id().as_bytes(), None::<&[u8]>, Some(empty))?
            .is_ok();
        if created {
            self.db.flush()?;
            tracing::info!(
                target: "dsa::store",
                tree = tree_name,
                actor = actor.id(),
                action = "CREATE",
                "[{}] created actor '{}'",
                tree_name,
                actor.id()
            );
        }
        Ok(created)
    }

    /// Issues a fresh session id and creates its empty record.
    ///
    /// Ids are random v4 UUIDs; collisions are not checked for.
    pub fn create_session(&self) -> CoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.ensure_actor(&ActorIdentity::Generated(id.clone()))?;
        Ok(id)
    }

    /// Records one answer for `actor`, creating the actor and category map on demand.
    /// Overwrites any previous answer to the same question.
    pub fn record_answer(
        &self,
        actor: &ActorIdentity,
        category: &str,
        question: &str,
        answer: &str,
        is_general: bool,
    ) -> CoreResult<()> {
        let (tree, tree_name) = self.tree_for(actor);
        let key = actor.id().as_bytes();
        let is_update = loop {
            let current: Option<IVec> = tree.get(key)?;
            let existed = current.is_some();
            let mut record = match &current {
                Some(bytes) => ActorRecord::from_bytes(bytes)?,
                None => ActorRecord::default(),
            };
            record.apply(category, question, answer, is_general);
            let next = record.to_bytes()?;
            match tree.compare_and_swap(key, current, Some(next))? {
                Ok(()) => break existed,
                Err(_) => {
                    tracing::debug!(
                        target: "dsa::store",
                        tree = tree_name,
                        actor = actor.id(),
                        "concurrent write detected, retrying"
                    );
                }
            }
        };
        self.db.flush()?;

        tracing::info!(
            target: "dsa::store",
            tree = tree_name,
            actor = actor.id(),
            category = if is_general { "general" } else { category },
            action = if is_update { "UPDATE" } else { "INSERT" },
            "[{}] {} answer for '{}' ({})",
            tree_name,
            if is_update { "updated" } else { "inserted" },
            actor.id(),
            if is_general { "general" } else { category }
        );
        Ok(())
    }

    /// Full record for `actor`, or `None` if nothing was ever stored for it.
    pub fn record(&self, actor: &ActorIdentity) -> CoreResult<Option<ActorRecord>> {
        let (tree, _) = self.tree_for(actor);
        match tree.get(actor.id().as_bytes())? {
            Some(bytes) => Ok(Some(ActorRecord::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// General answers plus the answers for `category`. Unknown actors and
    /// categories read as empty maps.
    pub fn get_answers(&self, actor: &ActorIdentity, category: &str) -> CoreResult<CategoryAnswers> {
        let record = self.record(actor)?.unwrap_or_default();
        let answers = record.answers_for(category);
        Ok(CategoryAnswers {
            general: record.general,
            answers,
        })
    }

    /// Replaces the persisted mirror of the question bank.
    pub fn mirror_questions(&self, bank: &QuestionBank) -> CoreResult<()> {
        self.questions.clear()?;
        for (category, questions) in bank.iter() {
            self.questions
                .insert(category.as_bytes(), serde_json::to_vec(questions)?)?;
        }
        self.db.flush()?;
        tracing::info!(
            target: "dsa::store",
            tree = QUESTIONS_TREE,
            categories = bank.len(),
            "[{}] mirrored {} categories",
            QUESTIONS_TREE,
            bank.len()
        );
        Ok(())
    }

    /// Number of stored (users, sessions).
    pub fn actor_counts(&self) -> (usize, usize) {
        (self.users.len(), self.sessions.len())
    }
}
