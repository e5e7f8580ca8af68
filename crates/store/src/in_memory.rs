//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use lexrag_core::article::Article;
use lexrag_core::conversation::{Conversation, ConversationId, Message};
use lexrag_core::error::StoreError;
use lexrag_core::store::{ArticleRepository, ConversationStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory store that keeps conversations, messages, and articles in
/// Vecs. Matches the SQLite backend's observable behavior so tests can
/// swap it in freely.
pub struct InMemoryStore {
    conversations: Arc<RwLock<Vec<Conversation>>>,
    messages: Arc<RwLock<Vec<Message>>>,
    articles: Arc<RwLock<Vec<Article>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            conversations: Arc::new(RwLock::new(Vec::new())),
            messages: Arc::new(RwLock::new(Vec::new())),
            articles: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn create_conversation(
        &self,
        owner_id: &str,
        title: &str,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(owner_id, title);
        self.conversations.write().await.push(conversation.clone());
        Ok(conversation)
    }

    async fn find_by_id_and_owner(
        &self,
        id: ConversationId,
        owner_id: &str,
    ) -> Result<Option<Conversation>, StoreError> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .iter()
            .find(|c| c.id == id && c.owner_id == owner_id)
            .cloned())
    }

    async fn list_active_by_owner(&self, owner_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let conversations = self.conversations.read().await;

        let mut results: Vec<Conversation> = conversations
            .iter()
            .filter(|c| c.owner_id == owner_id && c.active)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(results)
    }

    async fn save_conversation(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;

        let mut saved = conversation.clone();
        saved.updated_at = Utc::now();

        match conversations.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = saved,
            None => conversations.push(saved),
        }
        Ok(())
    }

    async fn create_message(&self, message: &Message) -> Result<(), StoreError> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.read().await;

        let mut results: Vec<Message> = messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(results)
    }
}

#[async_trait]
impl ArticleRepository for InMemoryStore {
    async fn upsert_article(&self, article: &Article) -> Result<(), StoreError> {
        let mut articles = self.articles.write().await;

        match articles.iter_mut().find(|a| a.number == article.number) {
            Some(existing) => {
                // Keep the original row identity, as the SQLite upsert does.
                let mut updated = article.clone();
                updated.id = existing.id;
                updated.created_at = existing.created_at;
                *existing = updated;
            }
            None => articles.push(article.clone()),
        }
        Ok(())
    }

    async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let articles = self.articles.read().await;

        let mut results: Vec<Article> = articles.to_vec();
        results.sort_by_key(|a| a.number);

        Ok(results)
    }

    async fn count_articles(&self) -> Result<u64, StoreError> {
        Ok(self.articles.read().await.len() as u64)
    }

    async fn clear_articles(&self) -> Result<(), StoreError> {
        self.articles.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_find() {
        let store = InMemoryStore::new();
        let conv = store
            .create_conversation("user-1", "Penalty for theft")
            .await
            .unwrap();

        let found = store.find_by_id_and_owner(conv.id, "user-1").await.unwrap();
        assert_eq!(found.unwrap().title, "Penalty for theft");

        let other_owner = store.find_by_id_and_owner(conv.id, "user-2").await.unwrap();
        assert!(other_owner.is_none());
    }

    #[tokio::test]
    async fn archived_drops_from_listing_but_stays_addressable() {
        let store = InMemoryStore::new();
        let mut conv = store.create_conversation("user-1", "title").await.unwrap();

        conv.archive();
        store.save_conversation(&conv).await.unwrap();

        assert!(store.list_active_by_owner("user-1").await.unwrap().is_empty());
        let found = store
            .find_by_id_and_owner(conv.id, "user-1")
            .await
            .unwrap()
            .unwrap();
        assert!(!found.active);
    }

    #[tokio::test]
    async fn save_moves_conversation_to_front() {
        let store = InMemoryStore::new();
        let first = store.create_conversation("user-1", "first").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store.create_conversation("user-1", "second").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        store.save_conversation(&first).await.unwrap();

        let listed = store.list_active_by_owner("user-1").await.unwrap();
        assert_eq!(listed[0].id, first.id);
    }

    #[tokio::test]
    async fn messages_filtered_and_ordered() {
        let store = InMemoryStore::new();
        let a = store.create_conversation("user-1", "a").await.unwrap();
        let b = store.create_conversation("user-1", "b").await.unwrap();

        store.create_message(&Message::user(a.id, "one")).await.unwrap();
        store.create_message(&Message::user(b.id, "noise")).await.unwrap();
        store.create_message(&Message::user(a.id, "two")).await.unwrap();

        let listed = store.list_messages(a.id).await.unwrap();
        let contents: Vec<&str> = listed.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn article_upsert_dedupes_on_number() {
        let store = InMemoryStore::new();
        store
            .upsert_article(&Article::new(634, "Theft", "old body"))
            .await
            .unwrap();
        store
            .upsert_article(&Article::new(634, "Theft", "new body"))
            .await
            .unwrap();

        assert_eq!(store.count_articles().await.unwrap(), 1);
        assert_eq!(store.list_articles().await.unwrap()[0].content, "new body");
    }
}
