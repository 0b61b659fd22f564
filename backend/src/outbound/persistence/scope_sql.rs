//! Render a [`QueryScope`] into parameterised PostgreSQL.
//!
//! Column names come only from [`ScopeField::column`], so no client text is
//! ever spliced into a statement. Predicate values become numbered bind
//! parameters in the order they appear in the scope. The select and count
//! statements share one `WHERE` clause and therefore one bind list.
//!
//! Ordering mirrors [`QueryScope::compare`]: NULLs first when ascending,
//! last when descending. An `id` tiebreak keeps pages stable.

use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types;

use crate::domain::query_scope::{
    Combinator, FilterValue, QueryScope, ScopeField, Scoped, SortOrder,
};

/// SQL text and ordered bind values for one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderedScope {
    pub select: String,
    pub count: String,
    pub binds: Vec<FilterValue>,
}

fn where_clause<E: Scoped>(scope: &QueryScope<E>, binds: &mut Vec<FilterValue>) -> String {
    let groups: Vec<String> = scope
        .groups()
        .iter()
        .map(|group| {
            let joiner = match group.combinator {
                Combinator::And => " AND ",
                Combinator::Or => " OR ",
            };
            let terms: Vec<String> = group
                .predicates
                .iter()
                .map(|predicate| {
                    binds.push(predicate.value.clone());
                    format!("{} = ${}", predicate.field.column(), binds.len())
                })
                .collect();
            format!("({})", terms.join(joiner))
        })
        .collect();
    if groups.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", groups.join(" AND "))
    }
}

fn order_clause<E: Scoped>(scope: &QueryScope<E>) -> String {
    let mut keys: Vec<String> = scope
        .sort_keys()
        .iter()
        .map(|key| match key.order {
            SortOrder::Asc => format!("{} ASC NULLS FIRST", key.field.column()),
            SortOrder::Desc => format!("{} DESC NULLS LAST", key.field.column()),
        })
        .collect();
    keys.push("id ASC".to_owned());
    format!(" ORDER BY {}", keys.join(", "))
}

/// Build the select and count statements for `scope` against `table`.
pub(crate) fn render<E: Scoped>(table: &str, scope: &QueryScope<E>) -> RenderedScope {
    let mut binds = Vec::new();
    let filter = where_clause(scope, &mut binds);

    let mut select = format!("SELECT * FROM {table}{filter}{}", order_clause(scope));
    let page = scope.page();
    if let Some(limit) = page.limit() {
        select.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = page.offset() {
        select.push_str(&format!(" OFFSET {offset}"));
    }
    let count = format!("SELECT COUNT(*) AS total FROM {table}{filter}");

    RenderedScope {
        select,
        count,
        binds,
    }
}

/// Attach bind values in order to a boxed raw query.
pub(crate) fn bind_all(
    query: BoxedSqlQuery<'static, Pg, SqlQuery>,
    binds: &[FilterValue],
) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    binds.iter().cloned().fold(query, |query, value| match value {
        FilterValue::Text(text) => query.bind::<sql_types::Text, _>(text),
        FilterValue::Uuid(uuid) => query.bind::<sql_types::Uuid, _>(uuid),
        FilterValue::Integer(number) => query.bind::<sql_types::BigInt, _>(number),
        FilterValue::Boolean(flag) => query.bind::<sql_types::Bool, _>(flag),
        FilterValue::Timestamp(at) => query.bind::<sql_types::Timestamptz, _>(at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        OrganisationCriteria, OrganisationField, OrganisationKind, OrganisationSearch,
        Organisation, OrganisationId, Person, PersonCriteria, PersonField,
    };
    use rstest::rstest;

    #[rstest]
    fn empty_scope_selects_everything_in_id_order() {
        let rendered = render("persons", &QueryScope::<Person>::new());

        assert_eq!(rendered.select, "SELECT * FROM persons ORDER BY id ASC");
        assert_eq!(rendered.count, "SELECT COUNT(*) AS total FROM persons");
        assert!(rendered.binds.is_empty());
    }

    #[rstest]
    fn binds_are_numbered_in_predicate_order_and_shared_with_count() {
        let school = OrganisationId::random();
        let scope = QueryScope::<Organisation>::new()
            .find_by(
                OrganisationCriteria {
                    administered_by: Some(school),
                    kind: Some(OrganisationKind::Class),
                    ..OrganisationCriteria::default()
                },
                Combinator::And,
            )
            .find_by(
                OrganisationSearch {
                    term: Some("1a".to_owned()),
                },
                Combinator::Or,
            );

        let rendered = render("organisations", &scope);

        let filter = " WHERE (administered_by = $1 AND kind = $2) AND (name = $3 OR identifier = $4)";
        assert_eq!(
            rendered.select,
            format!("SELECT * FROM organisations{filter} ORDER BY id ASC")
        );
        assert_eq!(
            rendered.count,
            format!("SELECT COUNT(*) AS total FROM organisations{filter}")
        );
        assert_eq!(
            rendered.binds,
            vec![
                FilterValue::Uuid(*school.as_uuid()),
                FilterValue::Text("KLASSE".to_owned()),
                FilterValue::Text("1a".to_owned()),
                FilterValue::Text("1a".to_owned()),
            ]
        );
    }

    #[rstest]
    fn sort_keys_and_window_follow_the_filter() {
        let scope = QueryScope::<Person>::new()
            .find_by(
                PersonCriteria {
                    family_name: Some("Hopper".to_owned()),
                    ..PersonCriteria::default()
                },
                Combinator::And,
            )
            .sort_by(PersonField::FamilyName, SortOrder::Asc)
            .sort_by(PersonField::Referrer, SortOrder::Desc)
            .paged(Some(20), Some(10));

        let rendered = render("persons", &scope);

        assert_eq!(
            rendered.select,
            "SELECT * FROM persons WHERE (family_name = $1) \
             ORDER BY family_name ASC NULLS FIRST, referrer DESC NULLS LAST, id ASC \
             LIMIT 10 OFFSET 20"
        );
        assert!(!rendered.count.contains("LIMIT"));
        assert!(!rendered.count.contains("ORDER BY"));
    }

    #[rstest]
    #[case(Some(0), None, " OFFSET 0")]
    #[case(None, Some(0), " LIMIT 0")]
    fn one_sided_windows_render_only_their_clause(
        #[case] offset: Option<u64>,
        #[case] limit: Option<u64>,
        #[case] suffix: &str,
    ) {
        let scope = QueryScope::<Person>::new().paged(offset, limit);

        let rendered = render("persons", &scope);

        assert!(rendered.select.ends_with(suffix), "{}", rendered.select);
    }
}
