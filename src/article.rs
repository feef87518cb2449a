use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Nullable, Text, Timestamp};
use diesel::{select, sql_query};
use rocket::serde::json::{self, Json};
use rocket::State;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::db::schema::articles;
use crate::db::{DbConnection, Pool};
use crate::topic;
use crate::types::{ApiError, ApiResult, Validate};
use crate::utils::{parse_id, serialize_date};

static SELECT_ARTICLES: &str = "SELECT articles.article_id,
       articles.title,
       articles.topic,
       articles.author,
       articles.created_at,
       articles.votes,
       count(comments.comment_id)::INT AS comment_count
  FROM articles LEFT JOIN comments ON articles.article_id = comments.article_id
 WHERE ($1::VARCHAR IS NULL OR articles.topic = $1)
 GROUP BY articles.article_id";

static SELECT_ARTICLE: &str = "SELECT articles.article_id,
       articles.title,
       articles.topic,
       articles.author,
       articles.body,
       articles.created_at,
       articles.votes,
       count(comments.comment_id)::INT AS comment_count
  FROM articles LEFT JOIN comments ON articles.article_id = comments.article_id
 WHERE articles.article_id = $1
 GROUP BY articles.article_id;";

lazy_static! {
    // sort_by value -> column expression spliced into ORDER BY. Nothing else
    // from the query string ever reaches the SQL text.
    static ref SORT_COLUMNS: HashMap<&'static str, &'static str> = {
        let mut columns = HashMap::new();
        columns.insert("article_id", "articles.article_id");
        columns.insert("title", "articles.title");
        columns.insert("topic", "articles.topic");
        columns.insert("author", "articles.author");
        columns.insert("body", "articles.body");
        columns.insert("created_at", "articles.created_at");
        columns.insert("votes", "articles.votes");
        columns.insert("comment_count", "comment_count");
        columns
    };
}

const DEFAULT_SORT: &str = "created_at";

#[derive(Queryable, Selectable, PartialEq, Debug, Serialize)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    pub votes: i32,
}

/// A listing row: no body, with the live comment count.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Integer)]
    pub comment_count: i32,
}

#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleDetail {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = Timestamp)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Integer)]
    pub comment_count: i32,
}

#[derive(Debug, Serialize)]
pub struct ArticleResponse<T> {
    article: T,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw `sort_by`/`order`/`topic` values as they arrive on the query string.
#[derive(Debug, Default)]
pub struct ArticleQueryParams {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ArticleQuery {
    sort_column: &'static str,
    order: SortOrder,
    topic: Option<String>,
}

impl Validate for ArticleQueryParams {
    type Output = ArticleQuery;

    fn validate(self) -> Result<ArticleQuery, ApiError> {
        let sort_by = self.sort_by.as_deref().unwrap_or(DEFAULT_SORT);
        let sort_column = SORT_COLUMNS
            .get(sort_by)
            .copied()
            .ok_or_else(|| ApiError::BadRequest("invalid sort_by query".into()))?;

        let order = match self.order.as_deref().map(str::to_ascii_lowercase) {
            None => SortOrder::Desc,
            Some(ref order) if order == "desc" => SortOrder::Desc,
            Some(ref order) if order == "asc" => SortOrder::Asc,
            Some(_) => return Err(ApiError::BadRequest("invalid order query".into())),
        };

        if let Some(ref slug) = self.topic {
            if !topic::is_known(slug) {
                return Err(ApiError::BadRequest("invalid topic query".into()));
            }
        }

        Ok(ArticleQuery {
            sort_column,
            order,
            topic: self.topic,
        })
    }
}

impl ArticleQuery {
    pub fn to_sql(&self) -> String {
        let order = self.order.as_sql();
        format!(
            "{} ORDER BY {} {}, articles.article_id {};",
            SELECT_ARTICLES, self.sort_column, order, order
        )
    }
}

pub fn not_found(article_id: i32) -> ApiError {
    ApiError::NotFound(format!("No article found for article_id: {}", article_id))
}

pub fn exists_by_id(article_id: i32, connection: &mut PgConnection) -> QueryResult<bool> {
    select(exists(articles::table.find(article_id))).get_result::<bool>(connection)
}

pub fn load_detail(article_id: i32, connection: &mut PgConnection) -> Result<ArticleDetail, ApiError> {
    debug!(article_id, "loading article");
    sql_query(SELECT_ARTICLE)
        .bind::<Integer, _>(article_id)
        .get_result::<ArticleDetail>(connection)
        .optional()?
        .ok_or_else(|| not_found(article_id))
}

#[get("/articles?<sort_by>&<order>&<topic>")]
pub fn list(
    pool: &State<Pool>,
    sort_by: Option<String>,
    order: Option<String>,
    topic: Option<String>,
) -> ApiResult<ArticlesResponse> {
    let query = ArticleQueryParams {
        sort_by,
        order,
        topic,
    }
    .validate()?;

    let mut connection = DbConnection::checkout(pool)?;
    let sql = query.to_sql();
    debug!(%sql, topic = ?query.topic, "listing articles");
    let articles = sql_query(sql)
        .bind::<Nullable<Text>, _>(query.topic)
        .load::<ArticleSummary>(&mut *connection)?;

    Ok(Json(ArticlesResponse { articles }))
}

#[get("/articles/<article_id>")]
pub fn get(pool: &State<Pool>, article_id: Result<i32, &str>) -> ApiResult<ArticleResponse<ArticleDetail>> {
    let article_id = parse_id(article_id)?;
    let mut connection = DbConnection::checkout(pool)?;
    let article = load_detail(article_id, &mut connection)?;
    Ok(Json(ArticleResponse { article }))
}

#[derive(Debug, Deserialize)]
pub struct VoteUpdate {
    inc_votes: i32,
}

#[patch("/articles/<article_id>", data = "<update>")]
pub fn update_votes(
    pool: &State<Pool>,
    article_id: Result<i32, &str>,
    update: Result<Json<VoteUpdate>, json::Error<'_>>,
) -> ApiResult<ArticleResponse<Article>> {
    let article_id = parse_id(article_id)?;
    let update = update?.into_inner();

    let mut connection = DbConnection::checkout(pool)?;
    debug!(article_id, inc_votes = update.inc_votes, "updating votes");
    let (lowest, highest) = vote_bounds(update.inc_votes);
    let updated = diesel::update(
        articles::table
            .find(article_id)
            .filter(articles::votes.between(lowest, highest)),
    )
    .set(articles::votes.eq(articles::votes + update.inc_votes))
    .get_result::<Article>(&mut *connection)
    .optional()?;

    if let Some(article) = updated {
        return Ok(Json(ArticleResponse { article }));
    }
    // the row exists but the increment would leave the INT range
    if exists_by_id(article_id, &mut connection)? {
        Err(ApiError::bad_request())
    } else {
        Err(not_found(article_id))
    }
}

/// Range the current vote count must lie in for `votes + delta` to fit in
/// an `INT` column.
fn vote_bounds(delta: i32) -> (i32, i32) {
    (i32::MIN - delta.min(0), i32::MAX - delta.max(0))
}
