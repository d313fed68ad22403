/*! Tests for hand-built block graphs.
 *
 * These construct bodies through the cursor builder the same way lowering does, verify their
 * structure, and run them through the interpreter to check what they compute.
 */

mod control_flow_tests;
