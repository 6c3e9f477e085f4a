use std::fs;
use std::path::Path;

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub const BARREL: &str = r#"/* eslint-disable */
/**
 * Generated `api` utility.
 *
 * THIS CODE IS AUTOMATICALLY GENERATED.
 */
import type * as legacy from "../legacy.js";
import type * as lib_utils from "../lib/utils.js";
import type * as missing from "../missing.js";
import type * as todos from "../todos.js";

import type {
  ApiFromModules,
  FilterApi,
  FunctionReference,
} from "convex/server";

declare const fullApi: ApiFromModules<{
  legacy: typeof legacy;
  "lib/utils": typeof lib_utils;
  missing: typeof missing;
  todos: typeof todos;
}>;
export declare const api: FilterApi<typeof fullApi, FunctionReference<any, "public">>;
"#;

pub const TODOS: &str = r#"import { v } from "convex/values";
import { mutation, query } from "./_generated/server";

export const getAll = query({
  handler: async (ctx) => {
    return await ctx.db.query("todos").collect();
  },
});

export const create = mutation({
  args: { text: v.string(), priority: v.optional(v.int64()) },
  handler: async (ctx, args) => {
    return await ctx.db.insert("todos", { text: args.text, done: false });
  },
});

export const toggle = mutation({
  args: { id: v.id("todos"), done: v.boolean() },
  handler: async (ctx, args) => {
    await ctx.db.patch(args.id, { done: args.done });
  },
});
"#;

pub const UTILS: &str = r#"import { v } from "convex/values";
import { action } from "../_generated/server";

export const formatDate = action({
  args: { timestamp: v.number, locale: v.optional(v.string()) },
  handler: async (_ctx, args) => new Date(args.timestamp).toLocaleString(args.locale),
});

export function helper() {
  return 1;
}
"#;

pub const LEGACY: &str = r#"import { query } from "./_generated/server";

export const ping = query({ handler: async () => "pong" });
"#;

/// Lay out a backend with a barrel, TypeScript and JavaScript modules, and
/// one barrel entry whose source file is missing.
pub fn write_backend(backend: &Path) {
    write_file(&backend.join("_generated/api.d.ts"), BARREL);
    write_file(&backend.join("todos.ts"), TODOS);
    write_file(&backend.join("lib/utils.ts"), UTILS);
    write_file(&backend.join("legacy.js"), LEGACY);
}
