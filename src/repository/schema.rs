// ==========================================
// 销售协同系统 - 数据库表结构
// ==========================================
// 存储形态: 实体 JSON 文档 + 少量索引列(id/编号/状态/关联)
// 说明: 索引列用于过滤与统计,文档列是实体事实
// ==========================================

use rusqlite::Connection;

/// 建表语句(幂等)
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS project (
    project_id      TEXT PRIMARY KEY,
    project_no      TEXT NOT NULL UNIQUE,
    status          TEXT NOT NULL,
    linked_order_id TEXT,
    doc             TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_project_status ON project(status);

CREATE TABLE IF NOT EXISTS sales_order (
    order_id    TEXT PRIMARY KEY,
    order_no    TEXT NOT NULL UNIQUE,
    project_id  TEXT NOT NULL UNIQUE,
    status      TEXT NOT NULL,
    doc         TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sales_order_status ON sales_order(status);

CREATE TABLE IF NOT EXISTS production_order (
    production_id TEXT PRIMARY KEY,
    production_no TEXT NOT NULL UNIQUE,
    order_id      TEXT NOT NULL UNIQUE,
    status        TEXT NOT NULL,
    doc           TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_production_status ON production_order(status);

CREATE TABLE IF NOT EXISTS service_ticket (
    ticket_id  TEXT PRIMARY KEY,
    ticket_no  TEXT NOT NULL UNIQUE,
    order_id   TEXT,
    status     TEXT NOT NULL,
    doc        TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_ticket_status ON service_ticket(status);
CREATE INDEX IF NOT EXISTS idx_ticket_order ON service_ticket(order_id);

CREATE TABLE IF NOT EXISTS catalog_item (
    item_id TEXT PRIMARY KEY,
    doc     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS seq_counter (
    seq_key    TEXT NOT NULL,
    period     TEXT NOT NULL,
    next_value INTEGER NOT NULL,
    PRIMARY KEY (seq_key, period)
);
"#;

/// 初始化表结构
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
